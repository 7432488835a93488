mod common;

#[cfg(test)]
mod class_tests {
    use crate::common::{run_err, run_ok};

    #[test]
    fn classes_print_their_name() {
        assert_eq!(run_ok("class Bagel {} print Bagel;"), "Bagel\n");
    }

    #[test]
    fn instances_print_class_and_marker() {
        assert_eq!(run_ok("class Bagel {} print Bagel();"), "Bagel instance\n");
    }

    #[test]
    fn initializer_round_trip() {
        let source = "\
class Foo {
  init(x) {
    this.x = x;
  }
}
var foo = Foo(5);
print foo.x;
";

        assert_eq!(run_ok(source), "5\n");
    }

    #[test]
    fn fields_can_be_set_and_read() {
        let source = "\
class Box {}
var b = Box();
b.contents = \"jam\";
print b.contents;
";

        assert_eq!(run_ok(source), "jam\n");
    }

    #[test]
    fn methods_are_called_with_this_bound() {
        let source = "\
class Person {
  init(name) {
    this.name = name;
  }
  sayName() {
    print this.name;
  }
}
Person(\"Jane\").sayName();
";

        assert_eq!(run_ok(source), "Jane\n");
    }

    #[test]
    fn detached_bound_method_remembers_its_instance() {
        let source = "\
class Person {
  init(name) {
    this.name = name;
  }
  sayName() {
    print this.name;
  }
}
var jane = Person(\"Jane\");
var method = jane.sayName;
method();
";

        assert_eq!(run_ok(source), "Jane\n");
    }

    #[test]
    fn fields_shadow_methods_on_lookup() {
        let source = "\
class Oops {
  label() {
    print \"method\";
  }
}
var o = Oops();
o.label = \"field\";
print o.label;
";

        assert_eq!(run_ok(source), "field\n");
    }

    #[test]
    fn methods_can_mutate_fields_across_calls() {
        let source = "\
class Counter {
  init() {
    this.count = 0;
  }
  bump() {
    this.count = this.count + 1;
    return this.count;
  }
}
var c = Counter();
c.bump();
c.bump();
print c.bump();
";

        assert_eq!(run_ok(source), "3\n");
    }

    #[test]
    fn initializer_with_bare_return_still_yields_the_instance() {
        let source = "\
class Foo {
  init() {
    this.ready = true;
    return;
    this.ready = false;
  }
}
print Foo();
print Foo().ready;
";

        assert_eq!(run_ok(source), "Foo instance\ntrue\n");
    }

    #[test]
    fn class_arity_follows_the_initializer() {
        let err = run_err("class Foo { init(x) {} } Foo();");

        assert!(err.contains("Expected 1 arguments but got 0."));
    }

    #[test]
    fn class_without_initializer_takes_no_arguments() {
        let err = run_err("class Foo {} Foo(1);");

        assert!(err.contains("Expected 0 arguments but got 1."));
    }

    #[test]
    fn undefined_property_read_is_an_error() {
        let err = run_err("class Foo {} print Foo().missing;");

        assert!(err.contains("Undefined property 'missing'."));
    }

    #[test]
    fn property_access_on_non_instance_is_an_error() {
        let err = run_err("var x = 1; print x.field;");

        assert!(err.contains("Only instances have properties."));
    }

    #[test]
    fn property_write_on_non_instance_is_an_error() {
        let err = run_err("var x = 1; x.field = 2;");

        assert!(err.contains("Only instances have fields."));
    }

    #[test]
    fn method_lookup_falls_back_to_the_superclass() {
        let source = "\
class Doughnut {
  cook() {
    print \"Fry until golden brown.\";
  }
}
class BostonCream < Doughnut {}
BostonCream().cook();
";

        assert_eq!(run_ok(source), "Fry until golden brown.\n");
    }

    #[test]
    fn subclass_methods_override_superclass_methods() {
        let source = "\
class A {
  speak() {
    print \"A\";
  }
}
class B < A {
  speak() {
    print \"B\";
  }
}
B().speak();
";

        assert_eq!(run_ok(source), "B\n");
    }

    #[test]
    fn inherited_initializer_runs_on_subclass_instantiation() {
        let source = "\
class Base {
  init(x) {
    this.x = x;
  }
}
class Derived < Base {}
print Derived(7).x;
";

        assert_eq!(run_ok(source), "7\n");
    }

    #[test]
    fn superclass_must_be_a_class() {
        let err = run_err("var NotAClass = \"so not\"; class Sub < NotAClass {}");

        assert!(err.contains("Superclass must be a class."));
    }

    #[test]
    fn methods_print_as_functions() {
        let source = "\
class C {
  m() {}
}
print C().m;
";

        assert_eq!(run_ok(source), "<fn m>\n");
    }

    #[test]
    fn instances_compare_by_identity() {
        let source = "\
class Foo {}
var a = Foo();
var b = Foo();
print a == a;
print a == b;
";

        assert_eq!(run_ok(source), "true\nfalse\n");
    }

    #[test]
    fn each_instance_has_its_own_fields() {
        let source = "\
class Holder {
  init(v) {
    this.v = v;
  }
}
var one = Holder(1);
var two = Holder(2);
print one.v;
print two.v;
";

        assert_eq!(run_ok(source), "1\n2\n");
    }
}

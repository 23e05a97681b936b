use self::utils::*;

use catam::{ast::Term, eval::Value};

mod utils {
    use pretty_assertions::assert_eq;

    use catam::{
        ast::Term,
        eval::{evaluate, Machine, Value},
        optimizer::optimize,
        parser::Parser,
    };

    #[track_caller]
    pub fn parse_success(src: &str) -> Term {
        match Parser::new("<test>", src).and_then(|mut parser| parser.parse()) {
            Ok(term) => term,
            Err(error) => panic!("parse failure:\n'{}'\n{}", src, error),
        }
    }

    #[track_caller]
    pub fn parse_failure(src: &str) -> String {
        match Parser::new("<test>", src).and_then(|mut parser| parser.parse()) {
            Ok(term) => panic!("parse success:\n'{}'\n{:#?}", src, term),
            Err(error) => error.to_string(),
        }
    }

    #[track_caller]
    pub fn evaluate_eq(src: &str, expected: Value) {
        let term = optimize(parse_success(src));
        assert_eq!(evaluate(&term), expected, "evaluating '{}'", src);
    }

    // The optimizer must not change what a program computes, whether or not
    // it manages to rewrite anything.
    #[track_caller]
    pub fn optimization_preserves(src: &str) {
        let term = parse_success(src);
        let optimized = optimize(term.clone());
        assert_eq!(
            evaluate(&term),
            evaluate(&optimized),
            "optimizing '{}'",
            src
        );
    }

    #[track_caller]
    pub fn instruction_count(term: &Term) -> usize {
        let mut machine = Machine::new();
        machine.run(term);
        machine.steps()
    }

    // Fixpoint form: no composition nested in a composition, no identity
    // composition step, and no pair followed by the projection or
    // application that would consume it.
    pub fn canonical(term: &Term) -> bool {
        match term {
            Term::Comp(children) => {
                children
                    .iter()
                    .all(|child| !matches!(child, Term::Comp(_) | Term::Id))
                    && children.windows(2).all(|pair| match (&pair[0], &pair[1]) {
                        (Term::Pair(_, _), Term::Fst | Term::Snd) => false,
                        (Term::Pair(left, _), Term::App) => !matches!(**left, Term::Cur(_)),
                        _ => true,
                    })
                    && children.iter().all(canonical)
            }
            Term::Pair(left, right) => canonical(left) && canonical(right),
            Term::Cur(body) => canonical(body),
            _ => true,
        }
    }

    pub fn mentions_application(term: &Term) -> bool {
        match term {
            Term::App | Term::Cur(_) => true,
            Term::Pair(left, right) => mentions_application(left) || mentions_application(right),
            Term::Comp(children) => children.iter().any(mentions_application),
            _ => false,
        }
    }
}

#[test]
fn literal() {
    evaluate_eq("1", Value::Int(1));
}

#[test]
fn sums() {
    evaluate_eq("(+ 1 2)", Value::Int(3));
    evaluate_eq("(+ 1 2 3 4)", Value::Int(10));
    evaluate_eq("(+ (+ 1 2) (+ 3 4))", Value::Int(10));
}

#[test]
fn identity_application() {
    evaluate_eq("((lambda (x) x) 42)", Value::Int(42));
}

#[test]
fn application_with_arithmetic() {
    evaluate_eq("((lambda (x) (+ x 2)) 1)", Value::Int(3));
}

#[test]
fn two_parameter_application() {
    evaluate_eq("((lambda (x y) (+ x y)) 3 4)", Value::Int(7));
    evaluate_eq("((lambda (x y) x) 1 2)", Value::Int(1));
    evaluate_eq("((lambda (x y) y) 1 2)", Value::Int(2));
}

#[test]
fn sum_inside_abstraction_body() {
    evaluate_eq("((lambda (x y) (+ x y 3)) 1 2)", Value::Int(6));
}

#[test]
fn nested_abstractions() {
    evaluate_eq("((lambda (x) ((lambda (y) (+ x y)) 2)) 1)", Value::Int(3));
    evaluate_eq("((lambda (x x) x) 1 2)", Value::Int(2));
}

#[test]
fn operator_must_be_an_abstraction() {
    assert_eq!(
        parse_failure("((lambda (f) (f 5)) (lambda (y) (+ y 1)))"),
        "Unexpected token: f."
    );
}

#[test]
fn unbound_variable_is_reported_by_name() {
    assert_eq!(parse_failure("((lambda (x) y) 1)"), "Unbound variable: y.");
}

#[test]
fn malformed_programs_are_rejected() {
    assert_eq!(parse_failure(""), "Unexpected end of input.");
    assert_eq!(parse_failure("(+ 1 2"), "Unexpected end of input.");
    assert_eq!(parse_failure("(+ 1)"), "Unexpected token: ).");
    assert_eq!(parse_failure("(1 2)"), "Unexpected token: 1.");
    assert_eq!(parse_failure("(lambda (x) x)"), "Unexpected token: lambda.");
    assert_eq!(parse_failure("1 2"), "Unexpected token: 2.");
}

#[test]
fn optimization_preserves_observable_values() {
    for src in [
        "1",
        "(+ 1 2)",
        "((lambda (x) x) 42)",
        "((lambda (x) (+ x 2)) 1)",
        "((lambda (x y) (+ x y)) 3 4)",
        "((lambda (x) ((lambda (y) (+ x y)) 2)) 1)",
        "((lambda (x y) (+ x y 3)) 1 2)",
    ] {
        optimization_preserves(src);
    }
}

#[test]
fn optimized_trees_are_in_canonical_form() {
    for src in [
        "(+ 1 2)",
        "((lambda (x) (+ x 2)) 1)",
        "((lambda (x y) (+ x y)) 3 4)",
        "((lambda (x) ((lambda (y) (+ x y)) 2)) 1)",
    ] {
        let optimized = catam::optimizer::optimize(parse_success(src));
        assert!(canonical(&optimized), "'{src}' left {optimized:?}");
    }
}

#[test]
fn optimization_eliminates_applications_and_saves_steps() {
    let term = parse_success("((lambda (x) (+ x 2)) 1)");
    let optimized = catam::optimizer::optimize(term.clone());

    assert!(!mentions_application(&optimized), "{optimized:?}");
    assert!(instruction_count(&optimized) < instruction_count(&term));
    assert_eq!(catam::eval::evaluate(&optimized), Value::Int(3));
}

#[test]
fn variables_compile_to_projection_paths() {
    // Deepest binder first: w is three Fst steps down, z is none
    let term = parse_success("((lambda (w x y z) (+ w z)) 1 2 3 4)");

    fn collect_paths(term: &Term, paths: &mut Vec<Vec<Term>>) {
        match term {
            Term::Comp(children) => {
                if children
                    .iter()
                    .all(|child| matches!(child, Term::Fst | Term::Snd))
                {
                    paths.push(children.clone());
                }
                children.iter().for_each(|child| collect_paths(child, paths));
            }
            Term::Pair(left, right) => {
                collect_paths(left, paths);
                collect_paths(right, paths);
            }
            Term::Cur(body) => collect_paths(body, paths),
            _ => {}
        }
    }

    let mut paths = Vec::new();
    collect_paths(&term, &mut paths);

    assert!(paths.contains(&vec![Term::Fst, Term::Fst, Term::Fst, Term::Snd]));
    assert!(paths.contains(&vec![Term::Snd]));
    // Every projection path ends in a single Snd
    for path in &paths {
        assert_eq!(path.last(), Some(&Term::Snd));
        assert!(path[..path.len() - 1]
            .iter()
            .all(|step| *step == Term::Fst));
    }
}

use std::fmt::Display;
use std::mem;

use crate::{
    ast::Term,
    visit::{walk, Flow, Visitor},
};

// Runtime values. A closure borrows its code from the program tree, which
// the driver keeps alive for the whole evaluation; everything else is owned.
#[derive(Clone, Debug, PartialEq)]
pub enum Value<'a> {
    Nil,
    Int(u64),
    Pair(Box<Value<'a>>, Box<Value<'a>>),
    Closure(Box<Value<'a>>, &'a Term),
}

impl Display for Value<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Nil => write!(f, "()"),
            Value::Int(value) => write!(f, "{}", value),
            Value::Pair(left, right) => write!(f, "({}, {})", left, right),
            Value::Closure(_, _) => write!(f, "<closure>"),
        }
    }
}

// The categorical abstract machine: an environment register transformed by
// each instruction, and a stack making room for the two halves of a pair.
// Precondition violations are bugs in the compiled program, not user
// errors, and panic.
pub struct Machine<'a> {
    env: Value<'a>,
    stack: Vec<Value<'a>>,
    steps: usize,
}

impl<'a> Machine<'a> {
    pub fn new() -> Machine<'a> {
        Machine {
            env: Value::Nil,
            stack: Vec::new(),
            steps: 0,
        }
    }

    /// Number of instructions executed so far.
    pub fn steps(&self) -> usize {
        self.steps
    }

    // Execute a program against the empty environment. On completion the
    // environment register holds the result and the stack has balanced out.
    pub fn run(&mut self, program: &'a Term) -> Value<'a> {
        self.env = Value::Nil;
        walk(program, self);

        debug_assert!(self.stack.is_empty(), "machine stack not balanced");
        self.take_env()
    }

    fn take_env(&mut self) -> Value<'a> {
        mem::replace(&mut self.env, Value::Nil)
    }
}

impl<'a> Default for Machine<'a> {
    fn default() -> Machine<'a> {
        Machine::new()
    }
}

pub fn evaluate<'a>(program: &'a Term) -> Value<'a> {
    Machine::new().run(program)
}

impl<'a> Visitor<'a> for Machine<'a> {
    fn visit_id(&mut self) -> Flow {
        self.steps += 1;
        Flow::Continue
    }

    fn visit_quote(&mut self, value: u64) -> Flow {
        self.steps += 1;
        self.env = Value::Int(value);
        Flow::Continue
    }

    fn visit_fst(&mut self) -> Flow {
        self.steps += 1;
        match self.take_env() {
            Value::Pair(left, _) => self.env = *left,
            env => panic!("first projection of non-pair environment {env:?}"),
        }
        Flow::Continue
    }

    fn visit_snd(&mut self) -> Flow {
        self.steps += 1;
        match self.take_env() {
            Value::Pair(_, right) => self.env = *right,
            env => panic!("second projection of non-pair environment {env:?}"),
        }
        Flow::Continue
    }

    // Addition wraps modulo 2^64.
    fn visit_plus(&mut self) -> Flow {
        self.steps += 1;
        match self.take_env() {
            Value::Pair(left, right) => match (*left, *right) {
                (Value::Int(m), Value::Int(n)) => self.env = Value::Int(m.wrapping_add(n)),
                (left, right) => panic!("addition of non-integers ({left:?}, {right:?})"),
            },
            env => panic!("addition of non-pair environment {env:?}"),
        }
        Flow::Continue
    }

    // Enter the closure body with its captured context paired against the
    // operand, re-entering the walk with this same machine.
    fn visit_app(&mut self) -> Flow {
        self.steps += 1;
        let (operator, operand) = match self.take_env() {
            Value::Pair(left, right) => (left, right),
            env => panic!("application of non-pair environment {env:?}"),
        };
        let Value::Closure(context, code) = *operator else {
            panic!("application of non-closure operator");
        };

        self.env = Value::Pair(context, operand);
        walk(code, self)
    }

    fn pair_pre(&mut self) -> Flow {
        self.steps += 1;
        self.stack.push(self.env.clone());
        Flow::Continue
    }

    fn pair_in(&mut self) -> Flow {
        self.steps += 1;
        let top = self.stack.last_mut().expect("machine stack underflow");
        mem::swap(&mut self.env, top);
        Flow::Continue
    }

    fn pair_post(&mut self) -> Flow {
        self.steps += 1;
        let left = self.stack.pop().expect("machine stack underflow");
        let right = self.take_env();
        self.env = Value::Pair(Box::new(left), Box::new(right));
        Flow::Continue
    }

    // The body is not executed now; it is captured together with the
    // current environment.
    fn cur_pre(&mut self, body: &'a Term) -> Flow {
        self.steps += 1;
        self.env = Value::Closure(Box::new(self.take_env()), body);
        Flow::Skip
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comp(children: Vec<Term>) -> Term {
        Term::Comp(children)
    }

    fn pair(left: Term, right: Term) -> Term {
        Term::Pair(Box::new(left), Box::new(right))
    }

    #[test]
    fn quote_replaces_environment() {
        assert_eq!(evaluate(&Term::Quote(42)), Value::Int(42));
    }

    #[test]
    fn pairing_runs_both_children_on_the_same_environment() {
        let term = pair(Term::Quote(1), Term::Quote(2));
        assert_eq!(
            evaluate(&term),
            Value::Pair(Box::new(Value::Int(1)), Box::new(Value::Int(2)))
        );
    }

    #[test]
    fn composition_threads_left_to_right() {
        let term = comp(vec![pair(Term::Quote(1), Term::Quote(2)), Term::Fst]);
        assert_eq!(evaluate(&term), Value::Int(1));
    }

    #[test]
    fn closure_captures_environment() {
        // Build (x, _) with x = 3, then apply (lambda y. x + y) to 4
        let body = comp(vec![
            pair(
                comp(vec![Term::Fst, Term::Snd]),
                comp(vec![Term::Snd]),
            ),
            Term::Plus,
        ]);
        let term = comp(vec![
            pair(Term::Id, Term::Quote(3)),
            pair(Term::Cur(Box::new(body)), Term::Quote(4)),
            Term::App,
        ]);

        assert_eq!(evaluate(&term), Value::Int(7));
    }

    #[test]
    fn addition_wraps() {
        let term = comp(vec![
            pair(Term::Quote(u64::MAX), Term::Quote(1)),
            Term::Plus,
        ]);
        assert_eq!(evaluate(&term), Value::Int(0));
    }

    #[test]
    fn machine_counts_instructions() {
        let term = comp(vec![pair(Term::Quote(1), Term::Quote(2)), Term::Plus]);
        let mut machine = Machine::new();

        assert_eq!(machine.run(&term), Value::Int(3));
        // PUSH, quote, SWAP, quote, CONS, add
        assert_eq!(machine.steps(), 6);
    }

    #[test]
    #[should_panic(expected = "non-pair environment")]
    fn projection_of_non_pair_is_a_bug() {
        evaluate(&Term::Fst);
    }

    #[test]
    fn display_renders_structure() {
        let value = Value::Pair(
            Box::new(Value::Int(1)),
            Box::new(Value::Pair(Box::new(Value::Int(2)), Box::new(Value::Nil))),
        );
        assert_eq!(value.to_string(), "(1, (2, ()))");
    }
}

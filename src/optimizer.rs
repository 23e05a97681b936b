use crate::{
    ast::Term,
    visit::{walk, Flow, Visitor},
};

// Work stack for the post-order rebuild. A compound node opens a marker
// frame on pre-visit; completed subtrees pile up above it until the
// post-visit folds them back into their parent. The markers also stop a
// projection from fusing with a completed sibling across a structure
// boundary.
enum Slot {
    Comp,
    Pair,
    Cur,
    Done(Term),
}

struct Optimizer {
    stack: Vec<Slot>,
    rewrites: usize,
}

impl Optimizer {
    fn new() -> Optimizer {
        Optimizer {
            stack: Vec::new(),
            rewrites: 0,
        }
    }

    fn push(&mut self, term: Term) {
        self.stack.push(Slot::Done(term));
    }

    fn pop(&mut self) -> Term {
        match self.stack.pop() {
            Some(Slot::Done(term)) => term,
            _ => unreachable!("rewrite stack out of shape"),
        }
    }

    // A completed subtree on top of the stack is this step's predecessor
    // only when both belong to the same composition. The nearest open marker
    // decides: anything but Comp means the top is a sibling from an
    // enclosing pair, which must not fuse.
    fn in_composition(&self) -> bool {
        self.stack
            .iter()
            .rev()
            .find_map(|slot| match slot {
                Slot::Done(_) => None,
                Slot::Comp => Some(true),
                _ => Some(false),
            })
            .unwrap_or(false)
    }

    fn top_is_pair(&self) -> bool {
        self.in_composition()
            && matches!(self.stack.last(), Some(Slot::Done(Term::Pair(_, _))))
    }
}

impl<'a> Visitor<'a> for Optimizer {
    fn visit_id(&mut self) -> Flow {
        self.push(Term::Id);
        Flow::Continue
    }

    fn visit_quote(&mut self, value: u64) -> Flow {
        self.push(Term::Quote(value));
        Flow::Continue
    }

    fn visit_plus(&mut self) -> Flow {
        self.push(Term::Plus);
        Flow::Continue
    }

    // A projection directly after a completed pair selects one component and
    // discards the other.
    fn visit_fst(&mut self) -> Flow {
        if self.top_is_pair() {
            let Term::Pair(left, _) = self.pop() else {
                unreachable!()
            };
            self.push(*left);
            self.rewrites += 1;
        } else {
            self.push(Term::Fst);
        }
        Flow::Continue
    }

    fn visit_snd(&mut self) -> Flow {
        if self.top_is_pair() {
            let Term::Pair(_, right) = self.pop() else {
                unreachable!()
            };
            self.push(*right);
            self.rewrites += 1;
        } else {
            self.push(Term::Snd);
        }
        Flow::Continue
    }

    // Application of a pair whose operator is a literal abstraction is a
    // beta redex: the abstraction body runs right after Pair(Id, operand).
    // The body was already rebuilt as part of the pair, so it moves out
    // rather than being copied.
    fn visit_app(&mut self) -> Flow {
        let is_redex = self.in_composition()
            && matches!(
                self.stack.last(),
                Some(Slot::Done(Term::Pair(left, _))) if matches!(**left, Term::Cur(_))
            );

        if is_redex {
            let Term::Pair(operator, operand) = self.pop() else {
                unreachable!()
            };
            let Term::Cur(body) = *operator else {
                unreachable!()
            };
            self.push(Term::Pair(Box::new(Term::Id), operand));
            self.push(*body);
            self.rewrites += 1;
        } else {
            self.push(Term::App);
        }
        Flow::Continue
    }

    fn comp_pre(&mut self) -> Flow {
        self.stack.push(Slot::Comp);
        Flow::Continue
    }

    // Reassemble the composition, splicing nested compositions inline and
    // dropping identities. An emptied composition canonicalizes to Id
    // without counting as a rewrite.
    fn comp_post(&mut self) -> Flow {
        let mut collected = Vec::new();
        loop {
            match self.stack.pop() {
                Some(Slot::Done(term)) => collected.push(term),
                Some(Slot::Comp) => break,
                _ => unreachable!("rewrite stack out of shape"),
            }
        }

        let mut children = Vec::with_capacity(collected.len());
        for term in collected.into_iter().rev() {
            match term {
                Term::Comp(inner) => {
                    children.extend(inner);
                    self.rewrites += 1;
                }
                Term::Id => self.rewrites += 1,
                term => children.push(term),
            }
        }

        if children.is_empty() {
            self.push(Term::Id);
        } else {
            self.push(Term::Comp(children));
        }
        Flow::Continue
    }

    fn pair_pre(&mut self) -> Flow {
        self.stack.push(Slot::Pair);
        Flow::Continue
    }

    fn pair_post(&mut self) -> Flow {
        let right = self.pop();
        let left = self.pop();
        match self.stack.pop() {
            Some(Slot::Pair) => {}
            _ => unreachable!("rewrite stack out of shape"),
        }
        self.push(Term::Pair(Box::new(left), Box::new(right)));
        Flow::Continue
    }

    fn cur_pre(&mut self, _body: &'a Term) -> Flow {
        self.stack.push(Slot::Cur);
        Flow::Continue
    }

    fn cur_post(&mut self) -> Flow {
        let body = self.pop();
        match self.stack.pop() {
            Some(Slot::Cur) => {}
            _ => unreachable!("rewrite stack out of shape"),
        }
        self.push(Term::Cur(Box::new(body)));
        Flow::Continue
    }
}

// One rewrite pass. Returns the rebuilt tree and the number of rewrites
// performed; zero rewrites means the result equals the input.
pub fn optimize_once(term: &Term) -> (Term, usize) {
    let mut optimizer = Optimizer::new();
    walk(term, &mut optimizer);

    let result = optimizer.pop();
    assert!(optimizer.stack.is_empty(), "rewrite stack out of shape");

    (result, optimizer.rewrites)
}

// Rewrite to fixpoint. Every counted rewrite strictly shrinks the tree, so
// the input size already bounds the number of productive passes.
pub fn optimize(mut term: Term) -> Term {
    for _ in 0..term.size() + 2 {
        let (rewritten, rewrites) = optimize_once(&term);
        if rewrites == 0 {
            return rewritten;
        }
        term = rewritten;
    }

    panic!("rewriting failed to reach a fixpoint");
}

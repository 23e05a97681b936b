use crate::ast::Term;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Flow {
    /// Proceed to the next scheduled step.
    Continue,
    /// From a pre-visit hook: leave the subtree unvisited, including its
    /// post-visit. From any other hook it is equivalent to Continue.
    Skip,
    /// Terminate the whole traversal immediately.
    Abort,
}

// Traversal capability over Term. Every hook defaults to a no-op so a
// visitor implements only the events it cares about. The 'a parameter lets
// hooks retain references into the walked tree; the machine relies on this
// for closure bodies.
pub trait Visitor<'a> {
    fn visit_id(&mut self) -> Flow {
        Flow::Continue
    }
    fn visit_fst(&mut self) -> Flow {
        Flow::Continue
    }
    fn visit_snd(&mut self) -> Flow {
        Flow::Continue
    }
    fn visit_quote(&mut self, _value: u64) -> Flow {
        Flow::Continue
    }
    fn visit_plus(&mut self) -> Flow {
        Flow::Continue
    }
    fn visit_app(&mut self) -> Flow {
        Flow::Continue
    }

    fn comp_pre(&mut self) -> Flow {
        Flow::Continue
    }
    fn comp_post(&mut self) -> Flow {
        Flow::Continue
    }

    fn pair_pre(&mut self) -> Flow {
        Flow::Continue
    }
    /// Fires between the two children of a pair.
    fn pair_in(&mut self) -> Flow {
        Flow::Continue
    }
    fn pair_post(&mut self) -> Flow {
        Flow::Continue
    }

    fn cur_pre(&mut self, _body: &'a Term) -> Flow {
        Flow::Continue
    }
    fn cur_post(&mut self) -> Flow {
        Flow::Continue
    }
}

// Drives a visitor over the tree in pre/in/post order. Returns Continue or
// Abort, never Skip.
pub fn walk<'a, V: Visitor<'a>>(term: &'a Term, visitor: &mut V) -> Flow {
    let flow = match term {
        Term::Id => visitor.visit_id(),
        Term::Fst => visitor.visit_fst(),
        Term::Snd => visitor.visit_snd(),
        Term::Quote(value) => visitor.visit_quote(*value),
        Term::Plus => visitor.visit_plus(),
        Term::App => visitor.visit_app(),

        Term::Comp(children) => {
            let mut flow = visitor.comp_pre();
            if flow == Flow::Continue {
                for child in children {
                    if walk(child, visitor) == Flow::Abort {
                        return Flow::Abort;
                    }
                }
                flow = visitor.comp_post();
            }
            flow
        }

        Term::Pair(left, right) => {
            let mut flow = visitor.pair_pre();
            if flow == Flow::Continue {
                if walk(left, visitor) == Flow::Abort
                    || visitor.pair_in() == Flow::Abort
                    || walk(right, visitor) == Flow::Abort
                {
                    return Flow::Abort;
                }
                flow = visitor.pair_post();
            }
            flow
        }

        Term::Cur(body) => {
            let mut flow = visitor.cur_pre(body);
            if flow == Flow::Continue {
                if walk(body, visitor) == Flow::Abort {
                    return Flow::Abort;
                }
                flow = visitor.cur_post();
            }
            flow
        }
    };

    match flow {
        Flow::Abort => Flow::Abort,
        _ => Flow::Continue,
    }
}

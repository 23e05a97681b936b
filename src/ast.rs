// The compilation target is the instruction set of the categorical abstract
// machine: nine combinators, each transforming the current environment.

#[derive(Clone, Debug, PartialEq)]
pub enum Term {
    /// Leaves the environment untouched.
    Id,
    /// Projects the first component of a pair environment.
    Fst,
    /// Projects the second component of a pair environment.
    Snd,
    /// Replaces the environment with a constant.
    Quote(u64),
    /// Adds the two integer components of a pair environment.
    Plus,
    /// Applies the closure in the first component of a pair environment to
    /// the value in its second.
    App,
    /// Captures the environment in a closure over the child term.
    Cur(Box<Term>),
    /// Runs both children against the same environment and pairs the results.
    Pair(Box<Term>, Box<Term>),
    /// Composition. Children are stored in execution order, so the machine
    /// runs them left to right: Comp(vec![g, f]) denotes f . g.
    Comp(Vec<Term>),
}

impl Term {
    // Number of nodes in the tree, counting this one
    pub fn size(&self) -> usize {
        match self {
            Term::Id | Term::Fst | Term::Snd | Term::Quote(_) | Term::Plus | Term::App => 1,
            Term::Cur(body) => 1 + body.size(),
            Term::Pair(left, right) => 1 + left.size() + right.size(),
            Term::Comp(children) => 1 + children.iter().map(Term::size).sum::<usize>(),
        }
    }
}

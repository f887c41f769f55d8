use anyhow::Result;
use gherkin_stream::{Builder, Token, TokenKind};

/// A run of consecutive tokens sharing one kind. Groups are built
/// once and never mutated afterwards.
#[derive(Debug)]
pub struct Group {
    pub kind: TokenKind,
    pub values: Vec<Token>,
}

/// The grouped token stream of one file. Groups live in source
/// order in a flat vector; neighbour relations are index
/// arithmetic, which gives the chain ergonomics without shared
/// mutable links.
#[derive(Debug, Default)]
pub struct GroupChain {
    groups: Vec<Group>,
}

impl GroupChain {
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn group(&self, index: usize) -> &Group {
        &self.groups[index]
    }

    pub fn kind_at(&self, index: usize) -> Option<TokenKind> {
        self.groups.get(index).map(|g| g.kind)
    }

    /// The nearest following group whose kind is not in `excluded`.
    pub fn next_skipping(&self, index: usize, excluded: &[TokenKind]) -> Option<&Group> {
        self.groups
            .iter()
            .skip(index + 1)
            .find(|g| !excluded.contains(&g.kind))
    }

    /// The nearest preceding group whose kind is not in `excluded`.
    pub fn prev_skipping(&self, index: usize, excluded: &[TokenKind]) -> Option<&Group> {
        self.groups[..index]
            .iter()
            .rev()
            .find(|g| !excluded.contains(&g.kind))
    }
}

/// Accumulates the token stream into a [`GroupChain`]: the first
/// token starts the head group, same-kind tokens append, a kind
/// change starts the next group. EOF terminates without appending.
#[derive(Debug, Default)]
pub struct ChainBuilder {
    groups: Vec<Group>,
}

impl ChainBuilder {
    pub fn into_chain(self) -> GroupChain {
        GroupChain {
            groups: self.groups,
        }
    }
}

impl Builder for ChainBuilder {
    fn build(&mut self, token: Option<Token>) -> Result<bool> {
        let Some(token) = token else {
            anyhow::bail!("token is not defined");
        };
        if token.is_eof() {
            return Ok(true);
        }

        match self.groups.last_mut() {
            Some(group) if group.kind == token.kind => group.values.push(token),
            _ => self.groups.push(Group {
                kind: token.kind,
                values: vec![token],
            }),
        }
        Ok(true)
    }

    fn start_rule(&mut self) -> Result<bool> {
        Ok(true)
    }

    fn end_rule(&mut self) -> Result<bool> {
        Ok(true)
    }

    fn reset(&mut self) {
        self.groups.clear();
    }
}

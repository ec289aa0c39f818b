//! Filter operators
//!
//! The closed set of comparison operators accepted in filter expressions.
//! Surface tokens are the lowercase names used on the wire
//! (`name__contains=John`).

use std::fmt;

/// Comparison operator in a filter expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    /// `eq` - value equality
    Eq,
    /// `ne` - value inequality
    Ne,
    /// `gt` - strictly greater
    Gt,
    /// `gte` - greater or equal
    Gte,
    /// `lt` - strictly less
    Lt,
    /// `lte` - less or equal
    Lte,
    /// `in` - membership in a comma-separated value list
    In,
    /// `between` - inclusive range, exactly two values
    Between,
    /// `like` - backend pattern match, wildcards pass through
    Like,
    /// `startswith` - anchored prefix match on string fields
    StartsWith,
    /// `contains` - substring match on string fields
    Contains,
}

impl Op {
    /// All operators, in wire-token order
    pub const ALL: &'static [Op] = &[
        Op::Eq,
        Op::Ne,
        Op::Gt,
        Op::Gte,
        Op::Lt,
        Op::Lte,
        Op::In,
        Op::Between,
        Op::Like,
        Op::StartsWith,
        Op::Contains,
    ];

    /// Parse a surface token (`eq`, `startswith`, ...)
    pub fn parse(token: &str) -> Option<Op> {
        let op = match token {
            "eq" => Op::Eq,
            "ne" => Op::Ne,
            "gt" => Op::Gt,
            "gte" => Op::Gte,
            "lt" => Op::Lt,
            "lte" => Op::Lte,
            "in" => Op::In,
            "between" => Op::Between,
            "like" => Op::Like,
            "startswith" => Op::StartsWith,
            "contains" => Op::Contains,
            _ => return None,
        };
        Some(op)
    }

    /// Wire token for this operator
    pub fn token(self) -> &'static str {
        match self {
            Op::Eq => "eq",
            Op::Ne => "ne",
            Op::Gt => "gt",
            Op::Gte => "gte",
            Op::Lt => "lt",
            Op::Lte => "lte",
            Op::In => "in",
            Op::Between => "between",
            Op::Like => "like",
            Op::StartsWith => "startswith",
            Op::Contains => "contains",
        }
    }

    /// Whether the operator consumes every comma-separated value token.
    /// All other operators take exactly one value.
    pub fn is_multi_valued(self) -> bool {
        matches!(self, Op::In | Op::Between)
    }

    /// Whether the operator is a string pattern match and therefore only
    /// valid on string-typed fields.
    pub fn is_string_match(self) -> bool {
        matches!(self, Op::Like | Op::StartsWith | Op::Contains)
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_every_token() {
        for op in Op::ALL {
            assert_eq!(Op::parse(op.token()), Some(*op));
        }
    }

    #[test]
    fn parse_rejects_unknown_tokens() {
        assert_eq!(Op::parse("equals"), None);
        assert_eq!(Op::parse("EQ"), None);
        assert_eq!(Op::parse(""), None);
    }

    #[test]
    fn multi_valued_operators() {
        assert!(Op::In.is_multi_valued());
        assert!(Op::Between.is_multi_valued());
        assert!(!Op::Eq.is_multi_valued());
        assert!(!Op::Contains.is_multi_valued());
    }
}

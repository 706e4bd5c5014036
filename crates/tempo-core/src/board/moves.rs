use crate::error::EngineError;
use shakmaty::{File, Move as RuleMove, Role, Square};
use std::fmt;
use std::str::FromStr;

/// A move in coordinate notation: source square, destination square and an
/// optional promotion piece. This is the currency of the search layer; it is
/// resolved against the rules library's legal move set before being played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<Role>,
}

impl Move {
    pub fn new(from: Square, to: Square) -> Self {
        Move {
            from,
            to,
            promotion: None,
        }
    }

    pub fn promoting(from: Square, to: Square, role: Role) -> Self {
        Move {
            from,
            to,
            promotion: Some(role),
        }
    }

    pub fn is_promotion(&self) -> bool {
        self.promotion.is_some()
    }

    /// Projects a rules-library move into coordinate form. Castling is
    /// rendered as the king's two-square travel (e1g1, not e1h1).
    pub fn from_rule_move(mv: &RuleMove) -> Option<Move> {
        match *mv {
            RuleMove::Normal {
                from,
                to,
                promotion,
                ..
            } => Some(Move {
                from,
                to,
                promotion,
            }),
            RuleMove::EnPassant { from, to } => Some(Move::new(from, to)),
            RuleMove::Castle { king, rook } => {
                let file = if rook.file() > king.file() {
                    File::G
                } else {
                    File::C
                };
                Some(Move::new(king, Square::from_coords(file, king.rank())))
            }
            RuleMove::Put { .. } => None,
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(role) = self.promotion {
            write!(f, "{}", role.char())?;
        }
        Ok(())
    }
}

impl FromStr for Move {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 4 && s.len() != 5 {
            return Err(EngineError::ParseError(format!(
                "move '{}' must be 4 or 5 characters",
                s
            )));
        }

        let from: Square = s[0..2]
            .parse()
            .map_err(|_| EngineError::ParseError(format!("bad source square in '{}'", s)))?;
        let to: Square = s[2..4]
            .parse()
            .map_err(|_| EngineError::ParseError(format!("bad destination square in '{}'", s)))?;

        let promotion = match s[4..].chars().next() {
            None => None,
            Some(c) => match Role::from_char(c.to_ascii_lowercase()) {
                Some(role @ (Role::Queen | Role::Rook | Role::Bishop | Role::Knight)) => {
                    Some(role)
                }
                _ => {
                    return Err(EngineError::ParseError(format!(
                        "bad promotion piece in '{}'",
                        s
                    )))
                }
            },
        };

        Ok(Move {
            from,
            to,
            promotion,
        })
    }
}

#![allow(clippy::missing_errors_doc)]

use std::{error::Error, fmt};

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use cascade_core::{GridPos, Palette, Token};
use cascade_session::query::BoardView;
use cascade_topology_grid::HexBoard;
use serde::{Deserialize, Serialize};

const SNAPSHOT_DOMAIN: &str = "cascade";
const SNAPSHOT_VERSION: &str = "v1";
/// Identifier prefix emitted before the encoded snapshot payload.
pub(crate) const SNAPSHOT_HEADER: &str = "cascade:v1";
/// Delimiter used to separate the prefix, board dimensions and payload.
const FIELD_DELIMITER: char = ':';

/// Widest palette any grid level uses; decoded colors must fit it.
const GRID_PALETTE_COLORS: u8 = 8;

/// Snapshot of the tokens occupying a grid board.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct BoardSnapshot {
    /// Number of columns contained in the board.
    pub(crate) columns: u32,
    /// Number of rows contained in the board.
    pub(crate) rows: u32,
    /// Tokens composing the layout captured by the snapshot.
    pub(crate) tokens: Vec<BoardToken>,
}

/// One occupied cell within a board snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct BoardToken {
    /// Zero-based row of the cell.
    pub(crate) row: u32,
    /// Zero-based column of the cell.
    pub(crate) column: u32,
    /// Palette index of the token color.
    pub(crate) color: u8,
}

impl BoardSnapshot {
    /// Captures a snapshot from a session's board view.
    pub(crate) fn capture(view: &BoardView) -> Self {
        Self {
            columns: view.columns(),
            rows: view.rows(),
            tokens: view
                .tokens()
                .iter()
                .map(|(position, token)| BoardToken {
                    row: position.row(),
                    column: position.column(),
                    color: token.color().index(),
                })
                .collect(),
        }
    }

    /// Encodes the snapshot into a single-line string suitable for clipboard transfer.
    #[must_use]
    pub(crate) fn encode(&self) -> String {
        let payload = SerializableSnapshot {
            tokens: self.tokens.clone(),
        };
        let json = serde_json::to_vec(&payload).expect("board snapshot serialization never fails");
        let encoded = STANDARD_NO_PAD.encode(json);
        format!("{SNAPSHOT_HEADER}:{}x{}:{encoded}", self.columns, self.rows)
    }

    /// Decodes a snapshot from the provided string representation.
    pub(crate) fn decode(value: &str) -> Result<Self, BoardTransferError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(BoardTransferError::EmptyPayload);
        }

        let mut parts = trimmed.split(FIELD_DELIMITER);
        let domain = parts.next().ok_or(BoardTransferError::MissingPrefix)?;
        let version = parts.next().ok_or(BoardTransferError::MissingVersion)?;
        let dimensions = parts.next().ok_or(BoardTransferError::MissingDimensions)?;
        let payload = parts.next().ok_or(BoardTransferError::MissingPayload)?;

        if domain != SNAPSHOT_DOMAIN {
            return Err(BoardTransferError::InvalidPrefix(domain.to_owned()));
        }
        if version != SNAPSHOT_VERSION {
            return Err(BoardTransferError::UnsupportedVersion(version.to_owned()));
        }

        let (columns, rows) = parse_dimensions(dimensions)?;
        let bytes = STANDARD_NO_PAD
            .decode(payload.as_bytes())
            .map_err(BoardTransferError::InvalidEncoding)?;
        let decoded: SerializableSnapshot =
            serde_json::from_slice(&bytes).map_err(BoardTransferError::InvalidPayload)?;

        Ok(Self {
            columns,
            rows,
            tokens: decoded.tokens,
        })
    }

    /// Rebuilds a playable board from the snapshot.
    pub(crate) fn to_board(&self) -> Result<HexBoard, BoardTransferError> {
        let palette = Palette::new(GRID_PALETTE_COLORS);
        let mut board = HexBoard::new(self.columns, self.rows);
        for entry in &self.tokens {
            let color = palette.color(entry.color).map_err(|_| {
                BoardTransferError::InvalidToken {
                    row: entry.row,
                    column: entry.column,
                }
            })?;
            board
                .set(
                    GridPos::new(entry.row, entry.column),
                    Some(Token::plain(color)),
                )
                .map_err(|_| BoardTransferError::InvalidToken {
                    row: entry.row,
                    column: entry.column,
                })?;
        }
        Ok(board)
    }
}

/// Payload serialized into the base64 segment; dimensions ride in the header.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct SerializableSnapshot {
    tokens: Vec<BoardToken>,
}

#[derive(Debug)]
pub(crate) enum BoardTransferError {
    /// The provided string was empty or contained only whitespace.
    EmptyPayload,
    /// The prefix segment was missing from the encoded snapshot.
    MissingPrefix,
    /// The encoded snapshot did not contain a version segment.
    MissingVersion,
    /// The encoded snapshot did not include board dimensions.
    MissingDimensions,
    /// The encoded snapshot did not include the payload segment.
    MissingPayload,
    /// The encoded snapshot used an unexpected prefix segment.
    InvalidPrefix(String),
    /// The encoded snapshot used an unsupported version identifier.
    UnsupportedVersion(String),
    /// The board dimensions could not be parsed from the encoded snapshot.
    InvalidDimensions(String),
    /// The base64 payload could not be decoded.
    InvalidEncoding(base64::DecodeError),
    /// The decoded payload could not be deserialised.
    InvalidPayload(serde_json::Error),
    /// A decoded token fell outside the board or its palette.
    InvalidToken { row: u32, column: u32 },
}

impl fmt::Display for BoardTransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPayload => write!(f, "board string was empty"),
            Self::MissingPrefix => write!(f, "board string is missing the prefix"),
            Self::MissingVersion => write!(f, "board string is missing the version"),
            Self::MissingDimensions => write!(f, "board string is missing the board dimensions"),
            Self::MissingPayload => write!(f, "board string is missing the payload"),
            Self::InvalidPrefix(prefix) => write!(f, "board prefix '{prefix}' is not supported"),
            Self::UnsupportedVersion(version) => {
                write!(f, "board version '{version}' is not supported")
            }
            Self::InvalidDimensions(dimensions) => {
                write!(f, "could not parse board dimensions '{dimensions}'")
            }
            Self::InvalidEncoding(error) => {
                write!(f, "could not decode board payload: {error}")
            }
            Self::InvalidPayload(error) => {
                write!(f, "could not parse board payload: {error}")
            }
            Self::InvalidToken { row, column } => {
                write!(f, "token at {row},{column} does not fit the board")
            }
        }
    }
}

impl Error for BoardTransferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidEncoding(error) => Some(error),
            Self::InvalidPayload(error) => Some(error),
            _ => None,
        }
    }
}

fn parse_dimensions(dimensions: &str) -> Result<(u32, u32), BoardTransferError> {
    let (columns, rows) = dimensions
        .split_once(['x', 'X'])
        .ok_or_else(|| BoardTransferError::InvalidDimensions(dimensions.to_owned()))?;

    let columns = columns
        .trim()
        .parse::<u32>()
        .map_err(|_| BoardTransferError::InvalidDimensions(dimensions.to_owned()))?;
    let rows = rows
        .trim()
        .parse::<u32>()
        .map_err(|_| BoardTransferError::InvalidDimensions(dimensions.to_owned()))?;

    if columns == 0 || rows == 0 {
        return Err(BoardTransferError::InvalidDimensions(
            dimensions.to_owned(),
        ));
    }

    Ok((columns, rows))
}

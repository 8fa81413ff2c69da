//! 错误类型定义

use thiserror::Error;

use crate::piece::PieceId;

/// 规则引擎错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChessError {
    /// 存档行的棋子类型标记无法识别
    #[error("line {line}: unknown piece type token {token:?}")]
    BadTypeToken { line: usize, token: String },

    /// 存档行的棋子编号不是整数
    #[error("line {line}: invalid piece id {token:?}")]
    BadPieceId { line: usize, token: String },

    /// 存档行的坐标对格式错误
    #[error("line {line}: malformed coordinate pair {token:?}")]
    BadCoordPair { line: usize, token: String },

    /// 存档行的已动标记无法识别
    #[error("line {line}: invalid moved flag {token:?}")]
    BadMovedFlag { line: usize, token: String },

    /// 存档行缺少字段
    #[error("line {line}: truncated piece line, missing {field} field")]
    MissingField { line: usize, field: &'static str },

    /// 走子方颜色名无法识别
    #[error("line {line}: unknown turn color {token:?}")]
    BadTurnColor { line: usize, token: String },

    /// 编号不存在的棋子
    #[error("no piece with id {0}")]
    UnknownPiece(PieceId),

    /// 棋子已不在场上
    #[error("piece {0} is not in play")]
    PieceNotInPlay(PieceId),

    /// 不是该阵营的回合
    #[error("not this side's turn")]
    NotYourTurn,
}

/// 规则引擎结果类型
pub type Result<T> = std::result::Result<T, ChessError>;

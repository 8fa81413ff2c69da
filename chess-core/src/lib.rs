//! 国际象棋核心规则库
//!
//! 包含:
//! - 棋子、坐标、格子编号等核心数据结构
//! - 按棋子类型的伪合法走法生成（含双进、吃过路兵、易位、升变标记）
//! - 威胁格计算与增量式将军检测
//! - 被吃棋子的场外区坐标分配
//! - 存档文本格式的编解码
//!
//! 渲染、拾取与窗口输入属于外部协作方，本库只暴露纯状态与查询。

mod attacks;
mod board;
mod capture;
mod constants;
mod error;
mod moves;
mod piece;
mod save;

pub use attacks::{AttackGenerator, CheckDetector};
pub use board::PieceRegistry;
pub use capture::CaptureYard;
pub use constants::*;
pub use error::{ChessError, Result};
pub use moves::{MoveEffect, MoveGenerator, MoveKind, MoveMap};
pub use piece::{Coord, Piece, PieceColor, PieceId, PieceType, SquareId};
pub use save::{GameSnapshot, Save};

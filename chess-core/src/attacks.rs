//! 威胁格计算与将军检测

use std::collections::HashSet;

use crate::board::PieceRegistry;
use crate::error::{ChessError, Result};
use crate::moves::{BISHOP_DIRS, KING_OFFSETS, KNIGHT_OFFSETS, ROOK_DIRS};
use crate::piece::{Piece, PieceId, PieceType, SquareId};

/// 威胁格生成器
///
/// 与走法生成同一套按类型的几何，但只计算纯吃子范围：不含易位、
/// 双进与吃过路兵。被将军时王的落点过滤与将军检测都建立在它上面。
pub struct AttackGenerator;

impl AttackGenerator {
    /// 指定棋子当前威胁到的全部格子
    ///
    /// 要求棋子在场；被吃的棋子不威胁任何格子。
    pub fn threatened_squares(reg: &PieceRegistry, id: PieceId) -> Result<HashSet<SquareId>> {
        let piece = reg.piece(id).ok_or(ChessError::UnknownPiece(id))?;
        if !piece.in_play {
            return Err(ChessError::PieceNotInPlay(id));
        }

        let mut squares = HashSet::new();
        match piece.piece_type {
            PieceType::Pawn => {
                // 斜前两格，无论是否有子
                let dir = piece.color.forward();
                for df in [-1, 1] {
                    if let Some(diag) = piece.coord.offset(df, dir) {
                        squares.insert(diag.pid());
                    }
                }
            }
            PieceType::Rook => Self::slide_threats(reg, piece, &ROOK_DIRS, &mut squares),
            PieceType::Bishop => Self::slide_threats(reg, piece, &BISHOP_DIRS, &mut squares),
            PieceType::Queen => {
                Self::slide_threats(reg, piece, &ROOK_DIRS, &mut squares);
                Self::slide_threats(reg, piece, &BISHOP_DIRS, &mut squares);
            }
            PieceType::Knight => {
                for &(df, dr) in &KNIGHT_OFFSETS {
                    if let Some(to) = piece.coord.offset(df, dr) {
                        squares.insert(to.pid());
                    }
                }
            }
            PieceType::King => {
                for &(df, dr) in &KING_OFFSETS {
                    if let Some(to) = piece.coord.offset(df, dr) {
                        squares.insert(to.pid());
                    }
                }
            }
        }
        Ok(squares)
    }

    /// 射线威胁
    ///
    /// 空格逐一累计；撞上的第一个子所在格无论颜色都算被威胁，
    /// 射线随即终止。王不阻挡射线，王身后的格子照样不安全。
    fn slide_threats(
        reg: &PieceRegistry,
        piece: &Piece,
        dirs: &[(i8, i8)],
        squares: &mut HashSet<SquareId>,
    ) {
        for &(df, dr) in dirs {
            let mut current = piece.coord;
            while let Some(to) = current.offset(df, dr) {
                squares.insert(to.pid());
                if let Some(target) = reg.piece_at(to) {
                    if target.piece_type != PieceType::King {
                        break;
                    }
                }
                current = to;
            }
        }
    }
}

/// 将军检测器
///
/// 增量式：只检查最后走子的棋子是否攻击到对方的王。移开后由
/// 另一子形成的闪将不会被发现（沿用原有行为）。
pub struct CheckDetector;

impl CheckDetector {
    /// 最后走子的棋子若正将军对方，返回它的编号
    pub fn checking_piece(reg: &PieceRegistry, last_mover: PieceId) -> Result<Option<PieceId>> {
        let mover = reg.piece(last_mover).ok_or(ChessError::UnknownPiece(last_mover))?;
        let Some(king) = reg.find_king(mover.color.opponent()) else {
            return Ok(None);
        };
        let threats = AttackGenerator::threatened_squares(reg, last_mover)?;
        Ok(threats.contains(&king.coord.pid()).then_some(last_mover))
    }
}

//! 棋子注册表与棋盘查询

use serde::{Deserialize, Serialize};

use crate::capture::CaptureYard;
use crate::error::{ChessError, Result};
use crate::moves::MoveEffect;
use crate::piece::{Coord, Piece, PieceColor, PieceId, PieceType};

/// 白方底线从 file 1 到 8 的子力排列，黑方镜像
const BACK_RANK: [PieceType; 8] = [
    PieceType::Rook,
    PieceType::Knight,
    PieceType::Bishop,
    PieceType::Queen,
    PieceType::King,
    PieceType::Bishop,
    PieceType::Knight,
    PieceType::Rook,
];

/// 棋子注册表
///
/// 持有整局棋固定的棋子集合并负责棋盘索引。棋子不会被销毁：
/// 被吃的棋子以 `in_play = false` 留在表中，存档与展示的记账
/// 因此保持一致。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceRegistry {
    pieces: Vec<Piece>,
}

impl PieceRegistry {
    /// 创建空注册表（读档重建与测试布局使用）
    pub fn empty() -> Self {
        Self { pieces: Vec::new() }
    }

    /// 创建标准初始布局
    ///
    /// 编号 1..=8 为白兵（第二横线），9..=16 为白方底线，
    /// 17..=24 为黑兵（第七横线），25..=32 为黑方底线。
    pub fn standard() -> Self {
        let mut reg = Self::empty();
        for file in 1..=8i8 {
            reg.insert(Piece::new(
                file as PieceId,
                PieceType::Pawn,
                PieceColor::White,
                Coord::new(file, 2),
            ));
        }
        for (i, piece_type) in BACK_RANK.iter().enumerate() {
            reg.insert(Piece::new(
                9 + i as PieceId,
                *piece_type,
                PieceColor::White,
                Coord::new(i as i8 + 1, 1),
            ));
        }
        for file in 1..=8i8 {
            reg.insert(Piece::new(
                16 + file as PieceId,
                PieceType::Pawn,
                PieceColor::Black,
                Coord::new(file, 7),
            ));
        }
        for (i, piece_type) in BACK_RANK.iter().enumerate() {
            reg.insert(Piece::new(
                25 + i as PieceId,
                *piece_type,
                PieceColor::Black,
                Coord::new(i as i8 + 1, 8),
            ));
        }
        reg
    }

    /// 追加一个棋子（不做规则检查）
    pub fn insert(&mut self, piece: Piece) {
        self.pieces.push(piece);
    }

    /// 按编号查找棋子
    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.iter().find(|p| p.id == id)
    }

    /// 按编号查找棋子（可变）
    pub fn piece_mut(&mut self, id: PieceId) -> Option<&mut Piece> {
        self.pieces.iter_mut().find(|p| p.id == id)
    }

    /// 查找占据指定格子的在场棋子
    pub fn piece_at(&self, coord: Coord) -> Option<&Piece> {
        self.pieces.iter().find(|p| p.in_play && p.coord == coord)
    }

    /// 全部棋子（含已被吃的）
    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    /// 指定阵营的全部在场棋子
    pub fn in_play(&self, color: PieceColor) -> impl Iterator<Item = &Piece> + '_ {
        self.pieces
            .iter()
            .filter(move |p| p.in_play && p.color == color)
    }

    /// 查找指定阵营的王
    pub fn find_king(&self, color: PieceColor) -> Option<&Piece> {
        self.pieces
            .iter()
            .find(|p| p.in_play && p.color == color && p.piece_type == PieceType::King)
    }

    /// 提交一个走子效果
    ///
    /// 被吃的棋子先移入吃子方的场外区并标记离场，然后移动主走子
    /// 与易位车，两者都记下已动标记。效果一旦通过校验即完整生效。
    pub fn apply(&mut self, effect: &MoveEffect, yard: &mut CaptureYard) -> Result<()> {
        let captor = self
            .piece(effect.mover)
            .ok_or(ChessError::UnknownPiece(effect.mover))?
            .color;

        if let Some(captured_id) = effect.captured {
            let slot = yard.next_slot(captor);
            let captured = self
                .piece_mut(captured_id)
                .ok_or(ChessError::UnknownPiece(captured_id))?;
            captured.coord = slot;
            captured.in_play = false;
            tracing::debug!(piece = captured_id, slot = %slot, "棋子被吃");
        }

        let mover = self
            .piece_mut(effect.mover)
            .ok_or(ChessError::UnknownPiece(effect.mover))?;
        mover.coord = effect.to;
        mover.has_moved = true;

        if let Some((rook_id, rook_to)) = effect.castle_rook {
            let rook = self
                .piece_mut(rook_id)
                .ok_or(ChessError::UnknownPiece(rook_id))?;
            rook.coord = rook_to;
            rook.has_moved = true;
        }

        Ok(())
    }
}

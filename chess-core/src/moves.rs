//! 走法生成

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::board::PieceRegistry;
use crate::constants::{BOARD_MAX, BOARD_MIN};
use crate::error::{ChessError, Result};
use crate::piece::{Coord, Piece, PieceColor, PieceId, PieceType, SquareId};

/// 走法种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveKind {
    /// 普通走子
    Quiet,
    /// 吃子
    Capture,
    /// 吃过路兵（被吃的兵不在落点格上）
    EnPassant,
    /// 王车易位
    Castle,
}

/// 走子效果
///
/// 生成阶段只产出描述值，提交由 [`PieceRegistry::apply`] 统一执行，
/// 效果与棋子状态之间不存在共享引用。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MoveEffect {
    pub kind: MoveKind,
    /// 主走子的棋子
    pub mover: PieceId,
    /// 主走子的落点
    pub to: Coord,
    /// 被吃的棋子
    pub captured: Option<PieceId>,
    /// 易位时随王移动的车及其落点
    pub castle_rook: Option<(PieceId, Coord)>,
    /// 落点触发升变，回合切换被搁置到升变选型之后
    pub promotes: bool,
}

impl MoveEffect {
    fn quiet(mover: &Piece, to: Coord) -> Self {
        Self {
            kind: MoveKind::Quiet,
            mover: mover.id,
            to,
            captured: None,
            castle_rook: None,
            promotes: Self::promotes_at(mover, to),
        }
    }

    fn capture(mover: &Piece, to: Coord, captured: PieceId) -> Self {
        Self {
            kind: MoveKind::Capture,
            mover: mover.id,
            to,
            captured: Some(captured),
            castle_rook: None,
            promotes: Self::promotes_at(mover, to),
        }
    }

    fn en_passant(mover: &Piece, to: Coord, captured: PieceId) -> Self {
        Self {
            kind: MoveKind::EnPassant,
            mover: mover.id,
            to,
            captured: Some(captured),
            castle_rook: None,
            promotes: false,
        }
    }

    fn castle(mover: &Piece, to: Coord, rook: PieceId, rook_to: Coord) -> Self {
        Self {
            kind: MoveKind::Castle,
            mover: mover.id,
            to,
            captured: None,
            castle_rook: Some((rook, rook_to)),
            promotes: false,
        }
    }

    /// 兵落到最远横线即进入待升变
    fn promotes_at(mover: &Piece, to: Coord) -> bool {
        mover.piece_type == PieceType::Pawn && to.rank == mover.color.promotion_rank()
    }
}

/// 目的格编号到走子效果的映射
pub type MoveMap = HashMap<SquareId, MoveEffect>;

/// 八个马步偏移
pub(crate) const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (2, 1),
    (2, -1),
    (-2, 1),
    (-2, -1),
    (1, 2),
    (1, -2),
    (-1, 2),
    (-1, -2),
];

/// 相邻八格偏移（王步）
pub(crate) const KING_OFFSETS: [(i8, i8); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

/// 直线滑行方向
pub(crate) const ROOK_DIRS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// 斜线滑行方向
pub(crate) const BISHOP_DIRS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// 走法生成器
///
/// 按棋子类型生成伪合法走法：几何上可行，不判断走完后己方王
/// 是否仍被攻击。王的安全性过滤由会话层在被将军时单独处理。
pub struct MoveGenerator;

impl MoveGenerator {
    /// 生成指定棋子的全部伪合法走法
    ///
    /// 要求棋子在场且轮到其阵营走子。
    pub fn generate(reg: &PieceRegistry, id: PieceId, turn: PieceColor) -> Result<MoveMap> {
        let piece = reg.piece(id).ok_or(ChessError::UnknownPiece(id))?;
        if !piece.in_play {
            return Err(ChessError::PieceNotInPlay(id));
        }
        if piece.color != turn {
            return Err(ChessError::NotYourTurn);
        }

        let mut moves = MoveMap::new();
        match piece.piece_type {
            PieceType::Pawn => Self::pawn_moves(reg, piece, &mut moves),
            PieceType::Rook => Self::slide_moves(reg, piece, &ROOK_DIRS, &mut moves),
            PieceType::Knight => Self::knight_moves(reg, piece, &mut moves),
            PieceType::Bishop => Self::slide_moves(reg, piece, &BISHOP_DIRS, &mut moves),
            PieceType::Queen => {
                Self::slide_moves(reg, piece, &ROOK_DIRS, &mut moves);
                Self::slide_moves(reg, piece, &BISHOP_DIRS, &mut moves);
            }
            PieceType::King => Self::king_moves(reg, piece, &mut moves),
        }
        Ok(moves)
    }

    /// 兵：直进一格、未动时直进两格、斜吃、吃过路兵
    fn pawn_moves(reg: &PieceRegistry, piece: &Piece, moves: &mut MoveMap) {
        let dir = piece.color.forward();

        // 直进一格，落点必须为空
        if let Some(one) = piece.coord.offset(0, dir) {
            if reg.piece_at(one).is_none() {
                moves.insert(one.pid(), MoveEffect::quiet(piece, one));

                // 未动过时可直进两格，途经格与落点均为空
                if !piece.has_moved {
                    if let Some(two) = piece.coord.offset(0, dir * 2) {
                        if reg.piece_at(two).is_none() {
                            moves.insert(two.pid(), MoveEffect::quiet(piece, two));
                        }
                    }
                }
            }
        }

        // 斜吃
        for df in [-1, 1] {
            if let Some(diag) = piece.coord.offset(df, dir) {
                if let Some(target) = reg.piece_at(diag) {
                    if target.color != piece.color && target.piece_type != PieceType::King {
                        moves.insert(diag.pid(), MoveEffect::capture(piece, diag, target.id));
                    }
                }
            }
        }

        // 吃过路兵：己方兵位于相对第五横线，同横线紧邻敌兵且斜后
        // 落点为空。不校验对方上一步是否恰好双进（沿用原有行为）。
        if piece.coord.rank == piece.color.en_passant_rank() {
            for df in [-1, 1] {
                let Some(beside) = piece.coord.offset(df, 0) else {
                    continue;
                };
                let Some(diag) = piece.coord.offset(df, dir) else {
                    continue;
                };
                if reg.piece_at(diag).is_some() {
                    continue;
                }
                if let Some(target) = reg.piece_at(beside) {
                    if target.color != piece.color && target.piece_type == PieceType::Pawn {
                        moves.insert(diag.pid(), MoveEffect::en_passant(piece, diag, target.id));
                    }
                }
            }
        }
    }

    /// 滑行棋子：空格加为普通走子并继续，敌子加为吃子后停下，
    /// 己方子直接停下。王不可成为吃子目标，射线在王处终止。
    fn slide_moves(reg: &PieceRegistry, piece: &Piece, dirs: &[(i8, i8)], moves: &mut MoveMap) {
        for &(df, dr) in dirs {
            let mut current = piece.coord;
            while let Some(to) = current.offset(df, dr) {
                match reg.piece_at(to) {
                    None => {
                        moves.insert(to.pid(), MoveEffect::quiet(piece, to));
                    }
                    Some(target) => {
                        if target.color != piece.color && target.piece_type != PieceType::King {
                            moves.insert(to.pid(), MoveEffect::capture(piece, to, target.id));
                        }
                        break;
                    }
                }
                current = to;
            }
        }
    }

    /// 马：八个固定偏移
    fn knight_moves(reg: &PieceRegistry, piece: &Piece, moves: &mut MoveMap) {
        for &(df, dr) in &KNIGHT_OFFSETS {
            if let Some(to) = piece.coord.offset(df, dr) {
                Self::step_move(reg, piece, to, moves);
            }
        }
    }

    /// 王：相邻八格加两侧易位
    fn king_moves(reg: &PieceRegistry, piece: &Piece, moves: &mut MoveMap) {
        for &(df, dr) in &KING_OFFSETS {
            if let Some(to) = piece.coord.offset(df, dr) {
                Self::step_move(reg, piece, to, moves);
            }
        }

        if !piece.has_moved {
            for rook_file in [BOARD_MIN, BOARD_MAX] {
                Self::castle_move(reg, piece, rook_file, moves);
            }
        }
    }

    /// 单步落点：空格为普通走子，敌子（王除外）为吃子
    fn step_move(reg: &PieceRegistry, piece: &Piece, to: Coord, moves: &mut MoveMap) {
        match reg.piece_at(to) {
            None => {
                moves.insert(to.pid(), MoveEffect::quiet(piece, to));
            }
            Some(target) => {
                if target.color != piece.color && target.piece_type != PieceType::King {
                    moves.insert(to.pid(), MoveEffect::capture(piece, to, target.id));
                }
            }
        }
    }

    /// 尝试添加向指定角线车方向的易位
    ///
    /// 角线上的车须同色、未动且在场，王车之间全部为空；王向车的
    /// 方向移动两格，车落在王跨过的格子上。不检查王经过的路径是
    /// 否被攻击（沿用原有行为）。
    fn castle_move(reg: &PieceRegistry, piece: &Piece, rook_file: i8, moves: &mut MoveMap) {
        // 王要能移动两格，与角车之间至少隔两格
        if (rook_file - piece.coord.file).abs() < 3 {
            return;
        }
        let rank = piece.coord.rank;
        let Some(rook) = reg.piece_at(Coord::new(rook_file, rank)) else {
            return;
        };
        if rook.piece_type != PieceType::Rook || rook.color != piece.color || rook.has_moved {
            return;
        }

        let (low, high) = if rook_file > piece.coord.file {
            (piece.coord.file, rook_file)
        } else {
            (rook_file, piece.coord.file)
        };
        for file in (low + 1)..high {
            if reg.piece_at(Coord::new(file, rank)).is_some() {
                return;
            }
        }

        let dir = if rook_file > piece.coord.file { 1 } else { -1 };
        let to = Coord::new(piece.coord.file + 2 * dir, rank);
        let rook_to = Coord::new(piece.coord.file + dir, rank);
        moves.insert(to.pid(), MoveEffect::castle(piece, to, rook.id, rook_to));
    }
}

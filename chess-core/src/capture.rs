//! 被吃棋子的场外区

use serde::{Deserialize, Serialize};

use crate::constants::{BOARD_MAX, BOARD_MIN};
use crate::piece::{Coord, PieceColor};

/// 场外区
///
/// 为被吃的棋子分配确定性的场外展示坐标，按吃子方阵营分区，
/// 只用于展示与存档，与对局规则无关。给定相同的吃子顺序必然
/// 产出相同的坐标序列，读档重建时也是如此。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureYard {
    white_next: Coord,
    black_next: Coord,
}

impl CaptureYard {
    /// 白方区从 (0,1) 开始，黑方区从 (9,8) 开始
    pub fn new() -> Self {
        Self {
            white_next: Coord::new(0, 1),
            black_next: Coord::new(9, 8),
        }
    }

    /// 取出吃子方的下一个空位并推进计数
    ///
    /// 白方区沿横线 1→8 递增，填满一列后向 file 负方向挪一列；
    /// 黑方区沿横线 8→1 递减，填满后向 file 正方向挪一列。
    pub fn next_slot(&mut self, captor: PieceColor) -> Coord {
        match captor {
            PieceColor::White => {
                let slot = self.white_next;
                self.white_next.rank += 1;
                if self.white_next.rank > BOARD_MAX {
                    self.white_next.rank = BOARD_MIN;
                    self.white_next.file -= 1;
                }
                slot
            }
            PieceColor::Black => {
                let slot = self.black_next;
                self.black_next.rank -= 1;
                if self.black_next.rank < BOARD_MIN {
                    self.black_next.rank = BOARD_MAX;
                    self.black_next.file += 1;
                }
                slot
            }
        }
    }
}

impl Default for CaptureYard {
    fn default() -> Self {
        Self::new()
    }
}

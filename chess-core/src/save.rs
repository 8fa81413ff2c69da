//! 存档文本格式
//!
//! 文法固定为三段：
//!
//! ```text
//! #WHITE
//! TYPE id file,rank hasMoved   （每行一个白方棋子）
//! #BLACK
//! TYPE id file,rank hasMoved   （每行一个黑方棋子）
//! #EXTRA
//! WHITE | BLACK                （当前走子方）
//! ```

use serde::{Deserialize, Serialize};

use crate::board::PieceRegistry;
use crate::capture::CaptureYard;
use crate::constants::{
    BOARD_MAX, BOARD_MIN, SAVE_BLACK_HEADER, SAVE_EXTRA_HEADER, SAVE_WHITE_HEADER,
};
use crate::error::{ChessError, Result};
use crate::piece::{Coord, Piece, PieceColor, PieceId, PieceType};

/// 完整的可存档状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub registry: PieceRegistry,
    pub turn: PieceColor,
    pub yard: CaptureYard,
}

/// 存档编解码器
pub struct Save;

impl Save {
    /// 编码为存档文本
    pub fn to_string(reg: &PieceRegistry, turn: PieceColor) -> String {
        let mut out = String::new();
        out.push_str(SAVE_WHITE_HEADER);
        out.push('\n');
        for piece in reg.pieces().iter().filter(|p| p.color == PieceColor::White) {
            out.push_str(&Self::piece_line(piece));
            out.push('\n');
        }
        out.push_str(SAVE_BLACK_HEADER);
        out.push('\n');
        for piece in reg.pieces().iter().filter(|p| p.color == PieceColor::Black) {
            out.push_str(&Self::piece_line(piece));
            out.push('\n');
        }
        out.push_str(SAVE_EXTRA_HEADER);
        out.push('\n');
        out.push_str(turn.token());
        out.push('\n');
        out
    }

    fn piece_line(piece: &Piece) -> String {
        format!(
            "{} {} {},{} {}",
            piece.piece_type.token(),
            piece.id,
            piece.coord.file,
            piece.coord.rank,
            piece.has_moved
        )
    }

    /// 解码存档文本
    ///
    /// file 不在 1..=8 内的棋子视为已被吃掉：标记离场并按行序领取
    /// 对方场外区的下一个空位，场外区计数因此被确定性重建。缺少
    /// `#EXTRA` 段时走子方默认白方。
    pub fn parse(text: &str) -> Result<GameSnapshot> {
        let mut registry = PieceRegistry::empty();
        let mut yard = CaptureYard::new();
        let mut turn = PieceColor::White;
        let mut section: Option<PieceColor> = None;

        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            let line_no = idx + 1;
            if line.is_empty() {
                continue;
            }
            if line == SAVE_WHITE_HEADER {
                section = Some(PieceColor::White);
                continue;
            }
            if line == SAVE_BLACK_HEADER {
                section = Some(PieceColor::Black);
                continue;
            }
            if line == SAVE_EXTRA_HEADER {
                section = None;
                continue;
            }

            match section {
                Some(color) => {
                    let mut piece = Self::parse_piece_line(line, line_no, color)?;
                    if piece.coord.file < BOARD_MIN || piece.coord.file > BOARD_MAX {
                        piece.in_play = false;
                        piece.coord = yard.next_slot(color.opponent());
                    }
                    registry.insert(piece);
                }
                None => {
                    turn = PieceColor::from_token(line).ok_or_else(|| {
                        tracing::debug!(line = line_no, token = line, "走子方颜色解析失败");
                        ChessError::BadTurnColor {
                            line: line_no,
                            token: line.to_string(),
                        }
                    })?;
                }
            }
        }

        Ok(GameSnapshot {
            registry,
            turn,
            yard,
        })
    }

    /// 解析单个棋子行，错误会点名出问题的字段
    fn parse_piece_line(line: &str, line_no: usize, color: PieceColor) -> Result<Piece> {
        let mut fields = line.split_whitespace();

        let type_token = fields.next().ok_or(ChessError::MissingField {
            line: line_no,
            field: "type",
        })?;
        let piece_type =
            PieceType::from_token(type_token).ok_or_else(|| ChessError::BadTypeToken {
                line: line_no,
                token: type_token.to_string(),
            })?;

        let id_token = fields.next().ok_or(ChessError::MissingField {
            line: line_no,
            field: "id",
        })?;
        let id: PieceId = id_token.parse().map_err(|_| ChessError::BadPieceId {
            line: line_no,
            token: id_token.to_string(),
        })?;

        let coord_token = fields.next().ok_or(ChessError::MissingField {
            line: line_no,
            field: "coordinate",
        })?;
        let coord = Self::parse_coord(coord_token, line_no)?;

        let moved_token = fields.next().ok_or(ChessError::MissingField {
            line: line_no,
            field: "moved flag",
        })?;
        let has_moved = match moved_token {
            "true" => true,
            "false" => false,
            _ => {
                return Err(ChessError::BadMovedFlag {
                    line: line_no,
                    token: moved_token.to_string(),
                })
            }
        };

        Ok(Piece {
            id,
            piece_type,
            color,
            coord,
            has_moved,
            in_play: true,
        })
    }

    fn parse_coord(token: &str, line_no: usize) -> Result<Coord> {
        let bad = || ChessError::BadCoordPair {
            line: line_no,
            token: token.to_string(),
        };
        let (file, rank) = token.split_once(',').ok_or_else(bad)?;
        let file: i8 = file.parse().map_err(|_| bad())?;
        let rank: i8 = rank.parse().map_err(|_| bad())?;
        Ok(Coord::new(file, rank))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_initial_position() {
        let reg = PieceRegistry::standard();
        let text = Save::to_string(&reg, PieceColor::White);

        assert!(text.starts_with("#WHITE\n"));
        assert!(text.contains("PAWN 1 1,2 false\n"));
        assert!(text.contains("KING 13 5,1 false\n"));
        assert!(text.contains("#BLACK\n"));
        assert!(text.contains("KING 29 5,8 false\n"));
        assert!(text.ends_with("#EXTRA\nWHITE\n"));
    }

    #[test]
    fn test_roundtrip_initial_position() {
        let reg = PieceRegistry::standard();
        let text = Save::to_string(&reg, PieceColor::Black);
        let snapshot = Save::parse(&text).unwrap();

        assert_eq!(snapshot.registry, reg);
        assert_eq!(snapshot.turn, PieceColor::Black);
    }

    #[test]
    fn test_roundtrip_with_captured_piece() {
        let mut reg = PieceRegistry::standard();
        let mut yard = CaptureYard::new();

        // 黑兵 17 被白方吃掉
        let slot = yard.next_slot(PieceColor::White);
        {
            let pawn = reg.piece_mut(17).unwrap();
            pawn.coord = slot;
            pawn.in_play = false;
        }

        let text = Save::to_string(&reg, PieceColor::Black);
        let snapshot = Save::parse(&text).unwrap();
        assert_eq!(snapshot.registry, reg);
        assert_eq!(snapshot.yard, yard);

        // 重建后的场外区紧接着已有序列分配
        let mut restored_yard = snapshot.yard;
        assert_eq!(restored_yard.next_slot(PieceColor::White), Coord::new(0, 2));
    }

    #[test]
    fn test_second_roundtrip_is_fixed_point() {
        let mut reg = PieceRegistry::standard();
        let mut yard = CaptureYard::new();
        for id in [17u32, 18, 9] {
            let captor = reg.piece(id).unwrap().color.opponent();
            let slot = yard.next_slot(captor);
            let piece = reg.piece_mut(id).unwrap();
            piece.coord = slot;
            piece.in_play = false;
        }

        let text1 = Save::to_string(&reg, PieceColor::White);
        let snap1 = Save::parse(&text1).unwrap();
        let text2 = Save::to_string(&snap1.registry, snap1.turn);
        let snap2 = Save::parse(&text2).unwrap();
        let text3 = Save::to_string(&snap2.registry, snap2.turn);

        assert_eq!(text2, text3);
        assert_eq!(snap1, snap2);
    }

    #[test]
    fn test_parse_assigns_yard_slot_to_off_board_piece() {
        let text = "#WHITE\nKING 13 5,1 true\n#BLACK\nPAWN 17 0,1 true\nKING 29 5,8 false\n#EXTRA\nWHITE\n";
        let snapshot = Save::parse(text).unwrap();

        let pawn = snapshot.registry.piece(17).unwrap();
        assert!(!pawn.in_play);
        // 黑棋子由白方吃掉，领取白方场外区的空位
        assert_eq!(pawn.coord, Coord::new(0, 1));

        let king = snapshot.registry.piece(13).unwrap();
        assert!(king.in_play);
        assert!(king.has_moved);
    }

    #[test]
    fn test_parse_defaults_turn_to_white() {
        let text = "#WHITE\nKING 13 5,1 false\n#BLACK\nKING 29 5,8 false\n";
        let snapshot = Save::parse(text).unwrap();
        assert_eq!(snapshot.turn, PieceColor::White);
    }

    #[test]
    fn test_parse_errors_name_offending_field() {
        // 类型标记
        let err = Save::parse("#WHITE\nDRAGON 1 1,2 false\n").unwrap_err();
        assert_eq!(
            err,
            ChessError::BadTypeToken {
                line: 2,
                token: "DRAGON".to_string()
            }
        );

        // 编号
        let err = Save::parse("#WHITE\nPAWN one 1,2 false\n").unwrap_err();
        assert_eq!(
            err,
            ChessError::BadPieceId {
                line: 2,
                token: "one".to_string()
            }
        );

        // 坐标对
        let err = Save::parse("#WHITE\nPAWN 1 1:2 false\n").unwrap_err();
        assert_eq!(
            err,
            ChessError::BadCoordPair {
                line: 2,
                token: "1:2".to_string()
            }
        );

        // 已动标记
        let err = Save::parse("#WHITE\nPAWN 1 1,2 yes\n").unwrap_err();
        assert_eq!(
            err,
            ChessError::BadMovedFlag {
                line: 2,
                token: "yes".to_string()
            }
        );

        // 字段不足
        let err = Save::parse("#WHITE\nPAWN 1\n").unwrap_err();
        assert_eq!(
            err,
            ChessError::MissingField {
                line: 2,
                field: "coordinate"
            }
        );

        // 走子方颜色
        let err = Save::parse("#WHITE\n#BLACK\n#EXTRA\nPURPLE\n").unwrap_err();
        assert_eq!(
            err,
            ChessError::BadTurnColor {
                line: 4,
                token: "PURPLE".to_string()
            }
        );
    }
}

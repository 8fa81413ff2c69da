//! 核心常量定义

/// 棋盘内坐标下界
pub const BOARD_MIN: i8 = 1;

/// 棋盘内坐标上界
pub const BOARD_MAX: i8 = 8;

/// 整局棋的棋子总数
pub const PIECE_COUNT: usize = 32;

/// 存档文件白方段落的标题行
pub const SAVE_WHITE_HEADER: &str = "#WHITE";

/// 存档文件黑方段落的标题行
pub const SAVE_BLACK_HEADER: &str = "#BLACK";

/// 存档文件附加段落的标题行（当前走子方）
pub const SAVE_EXTRA_HEADER: &str = "#EXTRA";

/// 快速存档的文件名
pub const QUICK_SAVE_NAME: &str = "save.txt";

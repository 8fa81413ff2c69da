//! 对局会话与本地存档
//!
//! 在 chess-core 规则库之上提供:
//! - 拾取事件驱动的选择/回合状态机 ([`GameSession`])
//! - 本地存档的读写、列表与删除 ([`StorageManager`])
//!
//! 渲染与输入解析由外部协作方完成，本库消费解析好的棋子/格子
//! 编号并暴露高亮、将军、升变等查询状态。

mod state;
mod storage;

pub use state::{GameSession, PickEvent};
pub use storage::{SavedGameInfo, StorageManager};

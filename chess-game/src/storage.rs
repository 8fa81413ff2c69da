//! 本地存档管理
//!
//! 提供跨平台的对局保存和加载（存档文本格式见 [`chess_core::Save`]）。

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chess_core::{PieceColor, Save, QUICK_SAVE_NAME};
use chrono::{DateTime, Utc};

use crate::state::GameSession;

/// 存档管理器
pub struct StorageManager {
    saves_dir: PathBuf,
}

impl StorageManager {
    /// 创建存档管理器（平台数据目录下的 saves 子目录）
    pub fn new() -> Result<Self> {
        Self::with_dir(default_saves_directory()?)
    }

    /// 在指定目录创建存档管理器
    pub fn with_dir(saves_dir: impl Into<PathBuf>) -> Result<Self> {
        let saves_dir = saves_dir.into();
        if !saves_dir.exists() {
            fs::create_dir_all(&saves_dir)
                .with_context(|| format!("无法创建存档目录: {:?}", saves_dir))?;
        }
        Ok(Self { saves_dir })
    }

    /// 保存对局到指定文件名
    pub fn save_game(&self, name: &str, session: &GameSession) -> Result<PathBuf> {
        let filepath = self.saves_dir.join(name);
        fs::write(&filepath, session.save_text())
            .with_context(|| format!("写入文件失败: {:?}", filepath))?;
        tracing::info!("对局已保存: {}", name);
        Ok(filepath)
    }

    /// 按时间戳生成文件名保存，返回文件名
    pub fn save_game_timestamped(&self, session: &GameSession) -> Result<String> {
        let filename = format!("{}.txt", Utc::now().format("%Y%m%d_%H%M%S"));
        self.save_game(&filename, session)?;
        Ok(filename)
    }

    /// 读取指定文件名的对局
    ///
    /// 文件缺失或内容损坏都是可恢复错误，调用方保留当前局面即可。
    pub fn load_game(&self, name: &str) -> Result<GameSession> {
        let filepath = self.saves_dir.join(name);
        if !filepath.exists() {
            anyhow::bail!("存档文件不存在: {}", name);
        }
        let content = fs::read_to_string(&filepath)
            .with_context(|| format!("读取文件失败: {:?}", filepath))?;
        let snapshot = Save::parse(&content).with_context(|| format!("解析存档失败: {}", name))?;
        Ok(GameSession::from_snapshot(snapshot))
    }

    /// 快速存档
    pub fn quick_save(&self, session: &GameSession) -> Result<PathBuf> {
        self.save_game(QUICK_SAVE_NAME, session)
    }

    /// 快速读档
    pub fn quick_load(&self) -> Result<GameSession> {
        self.load_game(QUICK_SAVE_NAME)
    }

    /// 列出所有存档，按保存时间倒序
    ///
    /// 损坏的存档文件记录警告后跳过，不中断列表。
    pub fn list_saved_games(&self) -> Result<Vec<SavedGameInfo>> {
        let mut games = Vec::new();
        if !self.saves_dir.exists() {
            return Ok(games);
        }

        let entries = fs::read_dir(&self.saves_dir)
            .with_context(|| format!("读取存档目录失败: {:?}", self.saves_dir))?;
        for entry in entries {
            let entry = entry.context("读取目录项失败")?;
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some("txt") {
                continue;
            }
            let Some(name) = path.file_name().and_then(|s| s.to_str()) else {
                continue;
            };

            let content = match fs::read_to_string(&path) {
                Ok(content) => content,
                Err(err) => {
                    tracing::warn!("跳过无法读取的存档文件 {}: {}", name, err);
                    continue;
                }
            };
            match Save::parse(&content) {
                Ok(snapshot) => {
                    let saved_at = entry
                        .metadata()
                        .and_then(|m| m.modified())
                        .map(DateTime::<Utc>::from)
                        .unwrap_or_else(|_| Utc::now());
                    games.push(SavedGameInfo {
                        name: name.to_string(),
                        turn: snapshot.turn,
                        pieces_in_play: snapshot
                            .registry
                            .pieces()
                            .iter()
                            .filter(|p| p.in_play)
                            .count(),
                        saved_at,
                    });
                }
                Err(err) => {
                    tracing::warn!("跳过损坏的存档文件 {}: {}", name, err);
                    continue;
                }
            }
        }

        games.sort_by(|a, b| b.saved_at.cmp(&a.saved_at));
        Ok(games)
    }

    /// 删除指定存档
    pub fn delete_game(&self, name: &str) -> Result<()> {
        let filepath = self.saves_dir.join(name);
        if filepath.exists() {
            fs::remove_file(&filepath).with_context(|| format!("删除文件失败: {:?}", filepath))?;
            tracing::info!("存档已删除: {}", name);
        }
        Ok(())
    }

    /// 存档目录路径
    pub fn saves_directory(&self) -> &Path {
        &self.saves_dir
    }
}

/// 存档条目信息
#[derive(Debug, Clone)]
pub struct SavedGameInfo {
    /// 文件名
    pub name: String,
    /// 存档时轮到的走子方
    pub turn: PieceColor,
    /// 在场棋子数
    pub pieces_in_play: usize,
    /// 保存时间（文件修改时间）
    pub saved_at: DateTime<Utc>,
}

impl SavedGameInfo {
    /// 格式化保存时间
    pub fn formatted_time(&self) -> String {
        self.saved_at.format("%Y-%m-%d %H:%M").to_string()
    }
}

/// 获取跨平台存档目录
fn default_saves_directory() -> Result<PathBuf> {
    let data_dir = dirs::data_dir().context("无法获取应用数据目录")?;
    Ok(data_dir.join("chess3d").join("saves"))
}

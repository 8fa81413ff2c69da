//! 对局会话状态

use std::collections::HashSet;

use chess_core::{
    AttackGenerator, CaptureYard, CheckDetector, Coord, GameSnapshot, MoveEffect, MoveGenerator,
    MoveMap, PieceColor, PieceId, PieceRegistry, PieceType, Save, SquareId, BOARD_MAX, BOARD_MIN,
};

/// 输入协作方解析出的点击事件
///
/// 像素坐标到棋子/格子编号的解析在拾取侧完成，核心只消费结果。
/// 两个编号都可能缺失（点到了棋盘外）。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PickEvent {
    pub piece_id: Option<PieceId>,
    pub square_id: Option<SquareId>,
}

/// 对局会话
///
/// 选择/回合状态机：空闲 → 已选中 → 正常提交回到空闲，或兵到达
/// 底线进入待升变；升变选型后补完被搁置的回合切换与将军判定。
#[derive(Debug, Clone)]
pub struct GameSession {
    registry: PieceRegistry,
    yard: CaptureYard,
    turn: PieceColor,
    selected: Option<PieceId>,
    legal_moves: MoveMap,
    checking_piece: Option<PieceId>,
    pending_promotion: Option<PieceId>,
    switching_sides: bool,
}

impl GameSession {
    /// 从标准初始局面开始新对局
    pub fn new() -> Self {
        Self::from_snapshot(GameSnapshot {
            registry: PieceRegistry::standard(),
            turn: PieceColor::White,
            yard: CaptureYard::new(),
        })
    }

    /// 从存档快照恢复对局
    pub fn from_snapshot(snapshot: GameSnapshot) -> Self {
        Self {
            registry: snapshot.registry,
            yard: snapshot.yard,
            turn: snapshot.turn,
            selected: None,
            legal_moves: MoveMap::new(),
            checking_piece: None,
            pending_promotion: None,
            switching_sides: false,
        }
    }

    /// 当前可存档的快照
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            registry: self.registry.clone(),
            turn: self.turn,
            yard: self.yard.clone(),
        }
    }

    /// 编码为存档文本
    pub fn save_text(&self) -> String {
        Save::to_string(&self.registry, self.turn)
    }

    /// 当前走子方
    pub fn turn(&self) -> PieceColor {
        self.turn
    }

    /// 棋子注册表
    pub fn registry(&self) -> &PieceRegistry {
        &self.registry
    }

    /// 当前选中的棋子
    pub fn selected(&self) -> Option<PieceId> {
        self.selected
    }

    /// 当前选中棋子的走法表（供高亮显示）
    pub fn legal_moves(&self) -> &MoveMap {
        &self.legal_moves
    }

    /// 当前走子方的王是否正被将军
    pub fn is_checked(&self) -> bool {
        self.checking_piece.is_some()
    }

    /// 正在将军的棋子
    pub fn checking_piece(&self) -> Option<PieceId> {
        self.checking_piece
    }

    /// 是否有兵正等待升变选型
    pub fn is_piece_promotable(&self) -> bool {
        self.pending_promotion.is_some()
    }

    /// 刚完成回合切换、等待协作方转场
    pub fn is_switching_sides(&self) -> bool {
        self.switching_sides
    }

    /// 协作方转场动画完成后清除信号
    pub fn finish_side_switch(&mut self) {
        self.switching_sides = false;
    }

    /// 处理一次点击
    ///
    /// 解析优先级：吃子（点到目标棋子）> 走子（点到目的格）>
    /// 重新选择 > 取消选择。待升变期间忽略点击。
    pub fn pick(&mut self, event: PickEvent) {
        if self.pending_promotion.is_some() {
            return;
        }

        if self.selected.is_some() {
            // 点到的棋子所在格有挂起的走法：吃子
            if let Some(target_id) = event.piece_id {
                if let Some(target) = self.registry.piece(target_id) {
                    if target.in_play {
                        if let Some(effect) = self.legal_moves.get(&target.coord.pid()).copied() {
                            self.invoke(effect);
                            return;
                        }
                    }
                }
            }
            // 点到的目的格在走法表中：走子
            if let Some(square) = event.square_id {
                if let Some(effect) = self.legal_moves.get(&square).copied() {
                    self.invoke(effect);
                    return;
                }
            }
        }

        self.try_select(event);
    }

    /// 升变选型
    ///
    /// 只接受后/车/象/马；没有待升变的兵时为空操作。被搁置的
    /// 回合切换与将军判定在此补上，判定使用升变后的新类型。
    pub fn promote(&mut self, piece_type: PieceType) {
        let Some(id) = self.pending_promotion else {
            return;
        };
        if !matches!(
            piece_type,
            PieceType::Queen | PieceType::Rook | PieceType::Bishop | PieceType::Knight
        ) {
            tracing::warn!(?piece_type, "忽略无效的升变类型");
            return;
        }
        self.pending_promotion = None;

        let Some(piece) = self.registry.piece_mut(id) else {
            return;
        };
        if !piece.in_play {
            return;
        }
        piece.piece_type = piece_type;
        tracing::info!(piece = id, ?piece_type, "兵升变");
        self.finish_turn(id);
    }

    /// 清除选择
    pub fn clear_selection(&mut self) {
        self.selected = None;
        self.legal_moves.clear();
    }

    /// 调试用的棋盘文本（白方大写，黑方小写，空格为点）
    pub fn board_text(&self) -> String {
        let mut out = String::new();
        for rank in (BOARD_MIN..=BOARD_MAX).rev() {
            for file in BOARD_MIN..=BOARD_MAX {
                let letter = self
                    .registry
                    .piece_at(Coord::new(file, rank))
                    .map_or('.', |p| p.letter());
                out.push(letter);
                if file < BOARD_MAX {
                    out.push(' ');
                }
            }
            out.push('\n');
        }
        out
    }

    /// 重新选择，找不到可选棋子则清除当前选择
    fn try_select(&mut self, event: PickEvent) {
        match self.selection_candidate(&event) {
            Some((id, piece_type)) => match MoveGenerator::generate(&self.registry, id, self.turn) {
                Ok(mut moves) => {
                    if self.checking_piece.is_some() && piece_type == PieceType::King {
                        self.cull_unsafe(&mut moves);
                    }
                    tracing::debug!(piece = id, count = moves.len(), "选中棋子");
                    self.selected = Some(id);
                    self.legal_moves = moves;
                }
                Err(err) => {
                    tracing::warn!(%err, "走法生成失败");
                    self.clear_selection();
                }
            },
            None => self.clear_selection(),
        }
    }

    /// 候选选择目标：优先棋子编号，其次格子编号，都要求己方在场
    fn selection_candidate(&self, event: &PickEvent) -> Option<(PieceId, PieceType)> {
        if let Some(id) = event.piece_id {
            if let Some(piece) = self.registry.piece(id) {
                if piece.in_play && piece.color == self.turn {
                    return Some((piece.id, piece.piece_type));
                }
            }
        }
        if let Some(square) = event.square_id {
            if let Some(coord) = Coord::from_pid(square) {
                if let Some(piece) = self.registry.piece_at(coord) {
                    if piece.color == self.turn {
                        return Some((piece.id, piece.piece_type));
                    }
                }
            }
        }
        None
    }

    /// 王被将军时剔除所有落在敌方威胁格上的走法
    fn cull_unsafe(&self, moves: &mut MoveMap) {
        let mut unsafe_squares: HashSet<SquareId> = HashSet::new();
        let enemies: Vec<PieceId> = self
            .registry
            .in_play(self.turn.opponent())
            .map(|p| p.id)
            .collect();
        for id in enemies {
            if let Ok(threats) = AttackGenerator::threatened_squares(&self.registry, id) {
                unsafe_squares.extend(threats);
            }
        }
        moves.retain(|square, _| !unsafe_squares.contains(square));
    }

    /// 提交一个走子效果
    fn invoke(&mut self, effect: MoveEffect) {
        let mover = effect.mover;
        if let Err(err) = self.registry.apply(&effect, &mut self.yard) {
            tracing::warn!(%err, "走子提交失败");
            return;
        }
        tracing::info!(piece = mover, to = %effect.to, kind = ?effect.kind, "提交走子");
        self.clear_selection();

        if effect.promotes {
            // 回合切换被搁置到升变选型之后
            self.pending_promotion = Some(mover);
            tracing::info!(piece = mover, "兵到达底线，等待升变");
        } else {
            self.finish_turn(mover);
        }
    }

    /// 完成回合切换：更新将军状态、交换走子方并发出转场信号
    fn finish_turn(&mut self, mover: PieceId) {
        self.checking_piece = CheckDetector::checking_piece(&self.registry, mover)
            .ok()
            .flatten();
        if let Some(id) = self.checking_piece {
            tracing::info!(piece = id, "将军");
        }
        self.turn = self.turn.opponent();
        self.clear_selection();
        self.switching_sides = true;
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

//! 命令行演示：通过拾取接口走一段开局并演练快速存档

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chess_core::Coord;
use chess_game::{GameSession, PickEvent, StorageManager};

fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("chess_game=debug".parse()?)
                .add_directive("chess_core=debug".parse()?),
        )
        .init();

    info!("国际象棋演示对局启动");

    let mut session = GameSession::new();

    // 王兵开局：白 e2-e4，黑 d7-d5，白 e4xd5
    play(&mut session, Coord::new(5, 2), Coord::new(5, 4));
    play(&mut session, Coord::new(4, 7), Coord::new(4, 5));
    play(&mut session, Coord::new(5, 4), Coord::new(4, 5));

    println!("{}", session.board_text());
    if session.is_checked() {
        println!("将军！");
    }

    let storage = StorageManager::new()?;
    let path = storage.quick_save(&session)?;
    info!("快速存档完成: {}", path.display());

    let restored = storage.quick_load()?;
    println!("读档后的局面:");
    println!("{}", restored.board_text());

    for game in storage.list_saved_games()? {
        println!(
            "存档 {} ({} 走子, {} 子在场, {})",
            game.name,
            game.turn.token(),
            game.pieces_in_play,
            game.formatted_time()
        );
    }

    Ok(())
}

/// 通过拾取接口完成一步：先点起点格选中，再点落点格提交
fn play(session: &mut GameSession, from: Coord, to: Coord) {
    session.pick(PickEvent {
        piece_id: None,
        square_id: Some(from.pid()),
    });
    session.pick(PickEvent {
        piece_id: None,
        square_id: Some(to.pid()),
    });
    session.finish_side_switch();
}

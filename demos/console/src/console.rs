//! Console event loop.

use crate::command::{Command, HeadMove, HELP};
use rover_client::{
    connect, ClientConfig, KillswitchToggle, Session, SessionSnapshot, TracingSink,
    TransportEvent,
};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

pub async fn run(url: &str, config: ClientConfig, view: String) -> anyhow::Result<()> {
    let mut connection = connect(url).await?;
    tracing::info!("Connected to {}", connection.url());
    let mut session = Session::new(config, connection.sender(), Arc::new(TracingSink));
    session.set_current_view(view);
    let mut killswitch = KillswitchToggle::new();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            // Push or lifecycle event from the rover
            event = connection.next_event() => {
                let Some(event) = event else { break };
                let closed = matches!(event, TransportEvent::Closed(_));
                session.handle_event(event);
                if closed {
                    break;
                }
            }

            // Command from the operator
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match line.parse::<Command>() {
                    Ok(Command::Quit) => break,
                    Ok(command) => execute(&mut session, &mut killswitch, command),
                    Err(e) => tracing::warn!("{}", e),
                }
            }
        }
    }

    tracing::info!("Session ended ({:?})", session.snapshot().ready_state);
    Ok(())
}

fn execute(session: &mut Session, killswitch: &mut KillswitchToggle, command: Command) {
    match command {
        Command::Help => println!("{HELP}"),
        Command::Status => print_status(&session.snapshot(), session.current_view()),
        Command::Ping => session.ping(),
        Command::Stop => session.stop(),
        Command::Forward => session.drive_forward(),
        Command::Backward => session.drive_backward(),
        Command::Left => session.turn_left(),
        Command::Right => session.turn_right(),
        Command::Head(HeadMove::Up) => session.camera_move_up(),
        Command::Head(HeadMove::Down) => session.camera_move_down(),
        Command::Head(HeadMove::Left) => session.camera_move_left(),
        Command::Head(HeadMove::Right) => session.camera_move_right(),
        Command::Head(HeadMove::Reset) => session.camera_reset_position(),
        Command::EnterDriverMode => {
            let request = session.enter_driver_mode();
            tokio::spawn(async move {
                match request.await {
                    Ok(id) => tracing::info!("Driver mode requested as client {}", id),
                    Err(e) => tracing::warn!("Driver mode not requested: {}", e),
                }
            });
        }
        Command::ExitDriverMode => session.exit_driver_mode(),
        Command::View(path) => {
            tracing::info!("Switched to view {}", path);
            session.set_current_view(path);
        }
        Command::Alert(text) => session.send_alert_notification(&text),
        Command::Killswitch(enabled) => {
            killswitch.on_change(session, enabled);
            tracing::info!("Rover interaction {}", killswitch.label());
        }
        Command::Block(ip) => session.block_ip(&ip),
        Command::Unblock(ip) => session.unblock_ip(&ip),
        Command::KillswitchState => session.request_killswitch_state(),
        Command::Snapshot => session.get_camera_snapshot(|payload| {
            let size = payload.to_string().len();
            tracing::info!("Snapshot received ({} bytes)", size);
        }),
        Command::Logs(since) => session.get_logging_entries(since.as_deref(), |payload| {
            let count = payload
                .get(0)
                .and_then(|entries| entries.as_array())
                .map_or(0, Vec::len);
            tracing::info!("{} log entries received", count);
        }),
        Command::UpTime => session.get_system_up_time(|up_time| {
            tracing::info!("Rover uptime: {}", up_time);
        }),
        Command::Quit => {}
    }
}

fn print_status(snapshot: &SessionSnapshot, view: &str) {
    let collisions = snapshot.collisions;
    println!("connection:   {:?}", snapshot.ready_state);
    println!("client id:    {}", snapshot.client_id);
    println!("view:         {}", view);
    println!(
        "driver mode:  {}",
        if snapshot.rover.is_driver_available { "available" } else { "taken" }
    );
    println!(
        "killswitch:   {} (rover state: {})",
        snapshot.killswitch_enabled, snapshot.rover.is_killswitch_enabled
    );
    println!(
        "collisions:   fl={} fr={} bl={} br={}",
        collisions.front_left, collisions.front_right, collisions.back_left, collisions.back_right
    );
    println!(
        "users:        {} connected, {} blocked",
        snapshot.connected_users.len(),
        snapshot.blocked_users.len()
    );
    println!(
        "self:         {} {}",
        snapshot.self_block.ip_address,
        if snapshot.self_block.is_blocked { "(blocked)" } else { "" }
    );
    if let Some(error) = &snapshot.last_error {
        println!("last error:   {}", error);
    }
    if let Some(sent) = &snapshot.last_sent {
        println!("last sent:    {}", sent);
    }
}

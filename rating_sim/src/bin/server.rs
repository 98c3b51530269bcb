use std::io::{BufRead, BufReader};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::thread;
use std::time::Duration;

use bevy::prelude::App;
use crossbeam_channel::{unbounded, Receiver, Sender};
use tracing::{error, info, warn};

use rating_math::{parse_command_line, CommandPayload, Rating, RecordSelector};
use rating_sim::{
    build_headless_app, request_check, request_modifier, run_cycle, CycleMetrics, RatingConfig,
    RatingStore,
};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut app = build_headless_app();
    let bind = app.world.resource::<RatingConfig>().command_bind;

    let command_rx = match spawn_command_listener(bind) {
        Ok(receiver) => receiver,
        Err(err) => {
            error!(
                target: "esoteric::server",
                %bind,
                error = %err,
                "command_listener.bind_failed"
            );
            std::process::exit(1);
        }
    };

    info!(
        target: "esoteric::server",
        command_bind = %bind,
        records = app.world.resource::<RatingStore>().len(),
        "rating server ready"
    );

    while let Ok(command) = command_rx.recv() {
        match command {
            CommandPayload::Cycle { steps } => {
                for _ in 0..steps {
                    run_cycle(&mut app);
                }
                report_cycle(&app);
            }
            CommandPayload::Modify { selector, delta } => {
                let matched = request_modifier(&mut app.world, &selector, delta);
                info!(
                    target: "esoteric::server",
                    %selector,
                    delta,
                    matched,
                    "command.applied=modify"
                );
            }
            CommandPayload::Check {
                selector,
                difficulty,
            } => {
                let matched = request_check(&mut app.world, &selector, difficulty);
                info!(
                    target: "esoteric::server",
                    %selector,
                    difficulty,
                    matched,
                    "command.applied=check"
                );
            }
            CommandPayload::Show { selector } => show_records(&app, &selector),
            CommandPayload::Spawn { name, rating } => spawn_record(&mut app, name, rating),
        }
    }
}

fn spawn_command_listener(bind_addr: SocketAddr) -> std::io::Result<Receiver<CommandPayload>> {
    let listener = TcpListener::bind(bind_addr)?;
    listener.set_nonblocking(true)?;

    let (sender, receiver) = unbounded::<CommandPayload>();
    thread::spawn(move || loop {
        match listener.accept() {
            Ok((stream, addr)) => {
                info!(target: "esoteric::server", %addr, "command client connected");
                let sender = sender.clone();
                thread::spawn(move || handle_client(stream, sender));
            }
            Err(ref err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                thread::sleep(Duration::from_millis(50));
            }
            Err(err) => {
                warn!(target: "esoteric::server", error = %err, "command client accept failed");
                thread::sleep(Duration::from_millis(200));
            }
        }
    });

    Ok(receiver)
}

fn handle_client(stream: TcpStream, sender: Sender<CommandPayload>) {
    // Accepted sockets inherit non-blocking mode on some platforms.
    if let Err(err) = stream.set_nonblocking(false) {
        warn!(target: "esoteric::server", error = %err, "command client setup failed");
        return;
    }
    let mut reader = BufReader::new(stream);
    let mut line = String::new();
    loop {
        line.clear();
        match reader.read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                match parse_command_line(trimmed) {
                    Ok(command) => {
                        if sender.send(command).is_err() {
                            break;
                        }
                    }
                    Err(err) => warn!(
                        target: "esoteric::server",
                        input = trimmed,
                        error = %err,
                        "command.rejected"
                    ),
                }
            }
            Err(err) => {
                warn!(target: "esoteric::server", error = %err, "command read failed");
                break;
            }
        }
    }
}

fn report_cycle(app: &App) {
    let metrics = app.world.resource::<CycleMetrics>();
    for failure in &metrics.failures {
        warn!(
            target: "esoteric::server",
            record = %failure.record,
            error = %failure.error,
            "cycle.record_failed"
        );
    }
    info!(
        target: "esoteric::server",
        cycle = metrics.cycle,
        modifiers = metrics.modifiers_applied,
        checks = metrics.checks_resolved,
        mutations = metrics.mutations_replayed,
        "cycle.reported"
    );
}

fn show_records(app: &App, selector: &RecordSelector) {
    let store = app.world.resource::<RatingStore>();
    for id in store.select(selector) {
        let Some(view) = store.view(id) else {
            continue;
        };
        match serde_json::to_string(&view) {
            Ok(json) => info!(target: "esoteric::server", record = %id, "{json}"),
            Err(err) => warn!(
                target: "esoteric::server",
                record = %id,
                error = %err,
                "record.serialize_failed"
            ),
        }
    }
}

fn spawn_record(app: &mut App, name: String, rating: Rating) {
    let id = app
        .world
        .resource_mut::<RatingStore>()
        .spawn(name.clone(), rating);
    info!(
        target: "esoteric::server",
        record = %id,
        %name,
        %rating,
        "command.applied=spawn"
    );
}

//! Interactive demo: a host "application" with the overlay on top.
//!
//! Press ` to open the overlay and type `help` into the console line. Up/Down browse history, Tab completes, Esc cancels.
//!
//! Run with: cargo run --example overlay_demo

use std::cell::RefCell;
use std::rc::Rc;

use overlay_tui::{
    key, Buffer, Candidate, Cell, CrosstermBackend, EventKind, LineSink, LogBuffer, LogView,
    Osc52Clipboard, Overlay, OverlayConfig, Panel, Rect, Result, Suggestions, TerminalBackend,
    TextInputConfig, Theme,
};
use overlay_tui::types::rgb;

const COMMANDS: &[(&str, &str)] = &[
    ("help", "list commands"),
    ("echo", "print arguments"),
    ("clear", "clear the log"),
    ("theme", "dark | light"),
    ("quit", "leave the demo"),
];

fn complete(text: &str) -> Suggestions {
    // Only the first word is a command.
    if text.contains(' ') {
        return Suggestions::default();
    }
    let candidates = COMMANDS
        .iter()
        .filter(|(name, _)| !text.is_empty() && name.starts_with(text) && *name != text)
        .map(|(name, hint)| Candidate::new(*name, *hint))
        .collect();
    Suggestions::new(0, candidates)
}

/// What the host draws underneath the overlay.
fn host_frame(width: u16, height: u16, tick: u64) -> Buffer {
    let mut frame = Buffer::new(width, height);
    frame.fill(rgb(20, 40, 70));
    let banner = "host application: press ` for the overlay, q to quit";
    for (i, ch) in banner.chars().enumerate() {
        frame.put(2 + i as i32, 1, Cell::new(ch, rgb(230, 230, 230), rgb(20, 40, 70)));
    }
    let x = (tick % width.max(1) as u64) as i32;
    frame.put(x, height as i32 / 2, Cell::new('●', rgb(250, 200, 60), rgb(20, 40, 70)));
    frame
}

fn run_command(line: &str, overlay: &mut Overlay, log: &mut LogBuffer) -> bool {
    let (name, args) = line.split_once(' ').unwrap_or((line, ""));
    match name {
        "help" => {
            for (name, hint) in COMMANDS {
                log.write_line(&format!("  {name:<6} {hint}"));
            }
        }
        "echo" => log.write_line(args),
        "clear" => log.clear(),
        "theme" => match args.trim() {
            "light" => overlay.set_theme(Theme::light()),
            "dark" => overlay.set_theme(Theme::dark()),
            other => log.write_line(&format!("unknown theme {other:?}")),
        },
        "quit" => return false,
        "" => {}
        other => tracing::warn!(command = other, "unknown command"),
    }
    true
}

fn main() -> Result<()> {
    let mut log = LogBuffer::default();
    tracing_subscriber::fmt()
        .with_writer(log.clone())
        .with_ansi(false)
        .without_time()
        .with_target(false)
        .with_max_level(tracing::Level::INFO)
        .init();

    let mut backend = CrosstermBackend::new();
    backend.init()?;
    let (width, height) = backend.size();

    let mut overlay = Overlay::new(width, height, OverlayConfig::default());
    overlay.set_clipboard(Box::new(Osc52Clipboard::stdout()));

    let root = overlay.root();
    let win_w = width.saturating_sub(4).min(80);
    let win_h = height.saturating_sub(2).min(24);
    let window = overlay.add_element(root, Rect::new(2, 1, win_w, win_h), Box::new(Panel::new()))?;
    overlay.add_element(
        window,
        Rect::new(1, 1, win_w.saturating_sub(2), win_h.saturating_sub(5)),
        Box::new(LogView::new(log.clone())),
    )?;

    let pending = Rc::new(RefCell::new(Vec::<String>::new()));
    let queue = pending.clone();
    let mut echo = log.clone();
    let console = TextInputConfig::new(Rect::new(
        1,
        win_h.saturating_sub(4) as i32,
        win_w.saturating_sub(2),
        3,
    ))
    .setter(move |line: &str| {
        echo.write_line(&format!("> {line}"));
        queue.borrow_mut().push(line.to_string());
    })
    .suggestions(complete)
    .clear_on_send(true)
    .lose_focus_on_send(false);
    let console = overlay.add_text_input(window, console)?;
    overlay.focus(console)?;
    if let Some(input) = overlay.text_input_mut(console) {
        input.editor_mut().begin_edit();
    }

    tracing::info!(width, height, "overlay demo started");

    let mut tick = 0u64;
    let mut running = true;
    while running {
        for event in backend.read_events(33) {
            if overlay.handle_event(&event) {
                continue;
            }
            // The host's own input handling.
            if event.kind == EventKind::KeyDown && event.key == Some('q' as u32) {
                running = false;
            }
            if event.kind == EventKind::KeyDown && event.key == Some(key::ESCAPE) && !overlay.is_open() {
                running = false;
            }
        }

        let commands: Vec<String> = pending.borrow_mut().drain(..).collect();
        for line in commands {
            running &= run_command(&line, &mut overlay, &mut log);
        }

        let (w, h) = overlay.surface().map_or((width, height), |s| (s.width, s.height));
        overlay.set_backdrop(&host_frame(w, h, tick));
        overlay.render();
        overlay.present(&mut backend)?;
        tick += 1;
    }

    backend.shutdown()
}

use std::sync::mpsc;

use eframe::egui;
use tray_icon::menu::{Menu, MenuEvent, MenuId, MenuItem, PredefinedMenuItem};
use tray_icon::{Icon, MouseButton, MouseButtonState, TrayIcon, TrayIconBuilder, TrayIconEvent};

const ICON_SIZE: u32 = 64;

/// Something the user picked from the tray.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrayCommand {
    Show,
    Hide,
    Settings,
    Quit,
}

#[derive(Clone, Debug)]
struct MenuIds {
    show: MenuId,
    hide: MenuId,
    settings: MenuId,
    quit: MenuId,
}

impl MenuIds {
    fn command_for(&self, id: &MenuId) -> Option<TrayCommand> {
        if *id == self.show {
            Some(TrayCommand::Show)
        } else if *id == self.hide {
            Some(TrayCommand::Hide)
        } else if *id == self.settings {
            Some(TrayCommand::Settings)
        } else if *id == self.quit {
            Some(TrayCommand::Quit)
        } else {
            None
        }
    }
}

/// Tray icon plus its menu. Events are forwarded to a channel and wake the
/// UI, so the menu keeps working while the buddy window is minimized.
pub struct Tray {
    /// On Linux the icon lives on its own GTK thread instead.
    #[cfg(not(target_os = "linux"))]
    _tray: TrayIcon,
    commands: mpsc::Receiver<TrayCommand>,
}

/// Solid blue square.
fn icon_rgba(size: u32) -> Vec<u8> {
    let mut rgba = Vec::with_capacity((size * size * 4) as usize);
    for _ in 0..size * size {
        rgba.extend_from_slice(&[0, 0, 255, 255]);
    }
    rgba
}

/// Build the icon and its menu. Must run on the thread that owns the
/// platform's tray event loop.
fn build_tray() -> Result<(TrayIcon, MenuIds), String> {
    let menu = Menu::new();

    let show = MenuItem::new("Show Buddy", true, None);
    let hide = MenuItem::new("Hide Buddy", true, None);
    let settings = MenuItem::new("Settings", true, None);
    let quit = MenuItem::new("Quit", true, None);
    let separator = PredefinedMenuItem::separator();

    let _ = menu.append(&show);
    let _ = menu.append(&hide);
    let _ = menu.append(&settings);
    let _ = menu.append(&separator);
    let _ = menu.append(&quit);

    let icon = Icon::from_rgba(icon_rgba(ICON_SIZE), ICON_SIZE, ICON_SIZE)
        .map_err(|e| format!("could not build tray icon: {e}"))?;

    let tray = TrayIconBuilder::new()
        .with_menu(Box::new(menu))
        .with_tooltip("Desktop Buddy")
        .with_icon(icon)
        .build()
        .map_err(|e| format!("system tray unavailable: {e}"))?;

    let ids = MenuIds {
        show: show.id().clone(),
        hide: hide.id().clone(),
        settings: settings.id().clone(),
        quit: quit.id().clone(),
    };
    Ok((tray, ids))
}

/// Wait for the tray thread to report whether the icon came up.
/// Any failure, including the thread dying, means running without a tray.
fn await_ready(ready: &mpsc::Receiver<Result<MenuIds, String>>) -> Option<MenuIds> {
    match ready.recv() {
        Ok(Ok(ids)) => Some(ids),
        Ok(Err(e)) => {
            log::warn!("Running without a tray: {e}");
            None
        }
        Err(_) => {
            log::warn!("Running without a tray: tray thread exited");
            None
        }
    }
}

impl Tray {
    /// `None` when the platform has no tray; the buddy window still works.
    pub fn new(ctx: &egui::Context) -> Option<Self> {
        #[cfg(target_os = "linux")]
        let ids = {
            let (ready_tx, ready_rx) = mpsc::channel::<Result<MenuIds, String>>();
            std::thread::spawn(move || {
                if let Err(e) = gtk::init() {
                    let _ = ready_tx.send(Err(format!("GTK init failed: {e}")));
                    return;
                }
                match build_tray() {
                    Ok((tray, ids)) => {
                        let _ = ready_tx.send(Ok(ids));
                        let _tray = tray;
                        gtk::main();
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                    }
                }
            });
            await_ready(&ready_rx)?
        };

        #[cfg(not(target_os = "linux"))]
        let (tray, ids) = match build_tray() {
            Ok(built) => built,
            Err(e) => {
                log::warn!("Running without a tray: {e}");
                return None;
            }
        };

        let (tx, rx) = mpsc::channel::<TrayCommand>();

        {
            let tx = tx.clone();
            let ctx = ctx.clone();
            MenuEvent::set_event_handler(Some(move |event: MenuEvent| {
                if let Some(cmd) = ids.command_for(event.id()) {
                    let _ = tx.send(cmd);
                    ctx.request_repaint();
                }
            }));
        }

        let ctx = ctx.clone();
        TrayIconEvent::set_event_handler(Some(move |event: TrayIconEvent| {
            if let TrayIconEvent::Click {
                button: MouseButton::Left,
                button_state: MouseButtonState::Up,
                ..
            } = event
            {
                let _ = tx.send(TrayCommand::Show);
                ctx.request_repaint();
            }
        }));

        Some(Self {
            #[cfg(not(target_os = "linux"))]
            _tray: tray,
            commands: rx,
        })
    }

    /// Next pending command, if any. Call from the eframe update loop.
    pub fn poll(&self) -> Option<TrayCommand> {
        self.commands.try_recv().ok()
    }
}

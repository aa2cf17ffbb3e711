//! Main TUI application state and event loop
//!
//! The loop never blocks on the network: effectful keys spawn one task
//! per operation and completions come back over an unbounded channel as
//! [`AppEvent`]s. All screen state is mutated here on the UI task.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame, Terminal,
};
use tokio::sync::mpsc;

use crate::api::{ApiClient, ApiError};
use crate::config::Config;
use crate::models::{
    AcquisitionType, Author, Category, Location, Publisher, ResourceKind, Vendor,
};
use crate::resources::{DraftState, Flag, RefOption, Resource, ViewPayload};

use super::menu::{MenuCommand, MenuScreen};
use super::pane::{PaneCommand, ResourcePane};
use super::ui::centered_rect;

/// Completed network round trip for one resource.
pub struct OpDone<R: Resource> {
    pub flag: Flag,
    /// Present on view completions; pairs the result with the fetch
    /// that issued it.
    pub generation: Option<u64>,
    pub result: Result<ViewPayload<R>, ApiError>,
}

/// Events delivered back to the UI loop from spawned tasks.
pub enum AppEvent {
    Location(OpDone<Location>),
    Category(OpDone<Category>),
    AcquisitionType(OpDone<AcquisitionType>),
    Vendor(OpDone<Vendor>),
    Publisher(OpDone<Publisher>),
    Author(OpDone<Author>),
    /// A picker's reference list arrived.
    Options {
        target: ResourceKind,
        picker: usize,
        result: Result<Vec<RefOption>, ApiError>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Active {
    Menu,
    Resource(ResourceKind),
}

enum Nav {
    Stay,
    Menu,
    Quit,
}

/// Main TUI application state
pub struct App {
    client: Arc<ApiClient>,
    tx: mpsc::UnboundedSender<AppEvent>,
    rx: mpsc::UnboundedReceiver<AppEvent>,

    active: Active,
    menu: MenuScreen,
    locations: ResourcePane<Location>,
    categories: ResourcePane<Category>,
    acquisition_types: ResourcePane<AcquisitionType>,
    vendors: ResourcePane<Vendor>,
    publishers: ResourcePane<Publisher>,
    authors: ResourcePane<Author>,

    pub should_quit: bool,
    show_help_popup: bool,
}

impl App {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Arc::new(ApiClient::new(config)?);
        let (tx, rx) = mpsc::unbounded_channel();

        Ok(Self {
            client,
            tx,
            rx,
            active: Active::Menu,
            menu: MenuScreen::new(),
            locations: ResourcePane::new(),
            categories: ResourcePane::new(),
            acquisition_types: ResourcePane::new(),
            vendors: ResourcePane::new(),
            publishers: ResourcePane::new(),
            authors: ResourcePane::new(),
            should_quit: false,
            show_help_popup: false,
        })
    }

    /// Run the main application loop
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        loop {
            terminal.draw(|f| self.draw(f))?;

            // completions first, then at most one key per frame
            while let Ok(app_event) = self.rx.try_recv() {
                self.on_event(app_event);
            }

            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.on_key(key);
                    }
                }
            }

            let now = Instant::now();
            self.locations.tick(now);
            self.categories.tick(now);
            self.acquisition_types.tick(now);
            self.vendors.tick(now);
            self.publishers.tick(now);
            self.authors.tick(now);

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn on_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::F(1) {
            self.show_help_popup = !self.show_help_popup;
            return;
        }
        if self.show_help_popup {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('q')) {
                self.show_help_popup = false;
            }
            return;
        }

        match self.active {
            Active::Menu => match self.menu.handle_key(key) {
                MenuCommand::None => {}
                MenuCommand::Quit => self.should_quit = true,
                MenuCommand::Open(kind) => self.open(kind),
            },
            Active::Resource(kind) => {
                let nav = match kind {
                    ResourceKind::Location => {
                        let cmd = self.locations.handle_key(key);
                        exec(&mut self.locations, cmd, &self.client, &self.tx, AppEvent::Location)
                    }
                    ResourceKind::Category => {
                        let cmd = self.categories.handle_key(key);
                        exec(&mut self.categories, cmd, &self.client, &self.tx, AppEvent::Category)
                    }
                    ResourceKind::AcquisitionType => {
                        let cmd = self.acquisition_types.handle_key(key);
                        exec(
                            &mut self.acquisition_types,
                            cmd,
                            &self.client,
                            &self.tx,
                            AppEvent::AcquisitionType,
                        )
                    }
                    ResourceKind::Vendor => {
                        let cmd = self.vendors.handle_key(key);
                        exec(&mut self.vendors, cmd, &self.client, &self.tx, AppEvent::Vendor)
                    }
                    ResourceKind::Publisher => {
                        let cmd = self.publishers.handle_key(key);
                        exec(&mut self.publishers, cmd, &self.client, &self.tx, AppEvent::Publisher)
                    }
                    ResourceKind::Author => {
                        let cmd = self.authors.handle_key(key);
                        exec(&mut self.authors, cmd, &self.client, &self.tx, AppEvent::Author)
                    }
                };
                match nav {
                    Nav::Stay => {}
                    Nav::Menu => self.active = Active::Menu,
                    Nav::Quit => self.should_quit = true,
                }
            }
        }
    }

    fn on_event(&mut self, app_event: AppEvent) {
        match app_event {
            AppEvent::Location(done) => {
                on_done(&mut self.locations, done, &self.client, &self.tx, AppEvent::Location)
            }
            AppEvent::Category(done) => {
                on_done(&mut self.categories, done, &self.client, &self.tx, AppEvent::Category)
            }
            AppEvent::AcquisitionType(done) => on_done(
                &mut self.acquisition_types,
                done,
                &self.client,
                &self.tx,
                AppEvent::AcquisitionType,
            ),
            AppEvent::Vendor(done) => {
                on_done(&mut self.vendors, done, &self.client, &self.tx, AppEvent::Vendor)
            }
            AppEvent::Publisher(done) => {
                on_done(&mut self.publishers, done, &self.client, &self.tx, AppEvent::Publisher)
            }
            AppEvent::Author(done) => {
                on_done(&mut self.authors, done, &self.client, &self.tx, AppEvent::Author)
            }
            AppEvent::Options {
                target,
                picker,
                result,
            } => {
                // only the vendor screen carries pickers today
                if target == ResourceKind::Vendor {
                    if let Some(p) = self.vendors.pickers_mut().get_mut(picker) {
                        p.apply(result);
                    }
                }
            }
        }
    }

    fn open(&mut self, kind: ResourceKind) {
        self.active = Active::Resource(kind);
        if kind == ResourceKind::Vendor {
            self.load_vendor_options();
        }
    }

    /// Kick off the picker reference fetches the first time the vendor
    /// screen opens. Failures stay visible in the picker; there is no
    /// automatic retry.
    fn load_vendor_options(&mut self) {
        for (picker, spec) in Vendor::PICKERS.iter().enumerate() {
            {
                let p = &mut self.vendors.pickers_mut()[picker];
                if !p.needs_load() {
                    continue;
                }
                p.mark_requested();
            }
            match spec.source {
                ResourceKind::Category => spawn_options::<Category>(
                    self.client.clone(),
                    self.tx.clone(),
                    ResourceKind::Vendor,
                    picker,
                ),
                ResourceKind::AcquisitionType => spawn_options::<AcquisitionType>(
                    self.client.clone(),
                    self.tx.clone(),
                    ResourceKind::Vendor,
                    picker,
                ),
                _ => {}
            }
        }
    }

    /// Draw the UI
    pub fn draw(&mut self, f: &mut Frame) {
        let size = f.size();

        match self.active {
            Active::Menu => self.menu.draw(f, size),
            Active::Resource(kind) => match kind {
                ResourceKind::Location => self.locations.draw(f, size),
                ResourceKind::Category => self.categories.draw(f, size),
                ResourceKind::AcquisitionType => self.acquisition_types.draw(f, size),
                ResourceKind::Vendor => self.vendors.draw(f, size),
                ResourceKind::Publisher => self.publishers.draw(f, size),
                ResourceKind::Author => self.authors.draw(f, size),
            },
        }

        if self.show_help_popup {
            self.draw_help_popup(f, size);
        }
    }

    /// Draw help popup with context-sensitive shortcuts
    fn draw_help_popup(&self, f: &mut Frame, area: Rect) {
        let popup_area = centered_rect(80, 70, area);

        f.render_widget(Clear, popup_area);

        let help_popup = Paragraph::new(self.get_context_help())
            .block(
                Block::default()
                    .title("Help - Context Shortcuts")
                    .borders(Borders::ALL)
                    .style(Style::default().fg(Color::Yellow)),
            )
            .style(Style::default().fg(Color::White));

        f.render_widget(help_popup, popup_area);
    }

    /// Get context-sensitive help content
    fn get_context_help(&self) -> String {
        let global_help = "Global Shortcuts:\n\
            F1 - Toggle this help\n\
            Esc - Back (form to table, table to menu)\n\n";

        let screen_help = match self.active {
            Active::Menu => {
                "Main Menu:\n\
                ↑/↓ - Navigate resources\n\
                Enter - Open resource\n\
                1-6 - Direct access\n\
                q - Quit"
                    .to_string()
            }
            Active::Resource(kind) => format!(
                "{} Screen:\n\
                Form: type to edit the focused field\n\
                Tab/Shift+Tab or ↑/↓ - Move between fields\n\
                Enter - View with form values as filters\n\
                F2 - Insert | F3 - Update | F4 - Clear form\n\
                Table: ↑/↓ - Select row | PageUp/PageDown - Change page\n\
                Enter/e - Edit row | d - Delete row | r - Refresh\n\
                Space - Toggle checkbox options (Vendor pickers)\n\
                q - Quit (from the table)",
                kind.title()
            ),
        };

        format!("{}{}", global_help, screen_help)
    }
}

/// Run one spawned operation and report back over the channel. The
/// receiver may be gone during shutdown, so send errors are ignored.
fn spawn_op<R: Resource>(
    client: Arc<ApiClient>,
    tx: mpsc::UnboundedSender<AppEvent>,
    wrap: fn(OpDone<R>) -> AppEvent,
    flag: Flag,
    generation: Option<u64>,
    body: R::Request,
) {
    tokio::spawn(async move {
        let result = client.execute::<R>(&body).await;
        let _ = tx.send(wrap(OpDone {
            flag,
            generation,
            result,
        }));
    });
}

/// Fetch a reference list for a picker: a view-all on the source
/// resource mapped onto option entries.
fn spawn_options<Src: Resource>(
    client: Arc<ApiClient>,
    tx: mpsc::UnboundedSender<AppEvent>,
    target: ResourceKind,
    picker: usize,
) {
    tokio::spawn(async move {
        let result = match Src::build_request(Flag::View, &DraftState::unset_for::<Src>()) {
            Ok(body) => client.execute::<Src>(&body).await.map(|payload| {
                payload
                    .records
                    .iter()
                    .filter_map(|record| record.option_entry())
                    .collect()
            }),
            Err(err) => Err(err),
        };
        let _ = tx.send(AppEvent::Options {
            target,
            picker,
            result,
        });
    });
}

/// Turn a pane command into a spawned operation or a navigation step.
fn exec<R: Resource>(
    pane: &mut ResourcePane<R>,
    command: PaneCommand,
    client: &Arc<ApiClient>,
    tx: &mpsc::UnboundedSender<AppEvent>,
    wrap: fn(OpDone<R>) -> AppEvent,
) -> Nav {
    match command {
        PaneCommand::None => Nav::Stay,
        PaneCommand::ToMenu => Nav::Menu,
        PaneCommand::Quit => Nav::Quit,
        PaneCommand::View { filtered } => {
            if let Some((generation, body)) = pane.begin_fetch(filtered) {
                spawn_op(client.clone(), tx.clone(), wrap, Flag::View, Some(generation), body);
            }
            Nav::Stay
        }
        PaneCommand::Insert => {
            if let Some(body) = pane.begin_write(Flag::Insert) {
                spawn_op(client.clone(), tx.clone(), wrap, Flag::Insert, None, body);
            }
            Nav::Stay
        }
        PaneCommand::Update => {
            if let Some(body) = pane.begin_write(Flag::Update) {
                spawn_op(client.clone(), tx.clone(), wrap, Flag::Update, None, body);
            }
            Nav::Stay
        }
        PaneCommand::ConfirmDelete => {
            if let Some(body) = pane.begin_confirmed_delete() {
                spawn_op(client.clone(), tx.clone(), wrap, Flag::Delete, None, body);
            }
            Nav::Stay
        }
    }
}

/// Feed a completion back into its pane, chaining the view-all re-fetch
/// after a successful write or delete.
fn on_done<R: Resource>(
    pane: &mut ResourcePane<R>,
    done: OpDone<R>,
    client: &Arc<ApiClient>,
    tx: &mpsc::UnboundedSender<AppEvent>,
    wrap: fn(OpDone<R>) -> AppEvent,
) {
    let chain = match done.flag {
        Flag::View => {
            pane.apply_fetch(done.generation.unwrap_or(0), done.result);
            false
        }
        Flag::Insert | Flag::Update => {
            pane.apply_write(done.flag, done.result.map(|p| p.message))
        }
        Flag::Delete => pane.apply_delete(done.result.map(|p| p.message)),
    };

    if chain {
        if let Some((generation, body)) = pane.begin_fetch(false) {
            spawn_op(client.clone(), tx.clone(), wrap, Flag::View, Some(generation), body);
        }
    }
}

use std::{io, sync::Arc, thread, time::Duration};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use rocketshoes_core::{
    CartStore, CatalogProduct, InventoryClient, KeyValueStore, Notification, NotificationLevel,
    Notifier, Product, UpdateProductAmount,
};
use tokio::sync::mpsc;
use tracing::{error, info};

const TICK_RATE: Duration = Duration::from_millis(250);
const MAX_NOTIFICATIONS: usize = 50;

#[derive(Debug, Clone)]
struct Theme {
    primary_fg: Color,
    accent: Color,
    muted: Color,
    selection_bg: Color,
    success: Color,
    danger: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary_fg: Color::White,
            accent: Color::Cyan,
            muted: Color::DarkGray,
            selection_bg: Color::DarkGray,
            success: Color::Green,
            danger: Color::Red,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pane {
    Catalog,
    Cart,
}

enum AppEvent {
    Input(Event),
    Tick,
}

/// Terminal view over a shared [`CartStore`].
pub struct CartApp<I, S, N> {
    store: Arc<CartStore<I, S, N>>,
    api_url: String,
    state: UiState,
    notifications: Vec<Notification>,
    notification_rx: Option<mpsc::UnboundedReceiver<Notification>>,
    theme: Theme,
}

impl<I, S, N> CartApp<I, S, N>
where
    I: InventoryClient,
    S: KeyValueStore,
    N: Notifier,
{
    pub fn new(store: Arc<CartStore<I, S, N>>, api_url: impl Into<String>) -> Self {
        Self {
            store,
            api_url: api_url.into(),
            state: UiState::default(),
            notifications: Vec::new(),
            notification_rx: None,
            theme: Theme::default(),
        }
    }

    /// Receive notifications raised by the store.
    pub fn attach_notifications(&mut self, receiver: mpsc::UnboundedReceiver<Notification>) {
        self.notification_rx = Some(receiver);
    }

    pub async fn run(&mut self) -> Result<()> {
        self.reload_catalog().await;

        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enter raw mode")?;
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to create terminal")?;
        terminal.hide_cursor()?;
        terminal.clear()?;

        let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(128);
        spawn_input_thread(event_tx);

        loop {
            self.drain_notifications();
            terminal.draw(|frame| self.draw(frame))?;
            if self.state.should_quit {
                break;
            }

            match event_rx.recv().await {
                Some(AppEvent::Input(Event::Key(key))) => {
                    if let Err(err) = self.handle_key(key).await {
                        self.state.set_status(format!("Error: {err}"));
                    }
                }
                Some(AppEvent::Input(_)) | Some(AppEvent::Tick) => {}
                None => break,
            }
        }

        restore_terminal(&mut terminal)?;
        Ok(())
    }

    async fn reload_catalog(&mut self) {
        match self.store.inventory().list_products().await {
            Ok(products) => {
                info!(total = products.len(), "catalog loaded");
                push_notification(
                    &mut self.notifications,
                    Notification::info(format!("Loaded {} products", products.len())),
                );
                self.state.set_catalog(products);
            }
            Err(err) => {
                error!(?err, "catalog request failed");
                self.state
                    .set_status(format!("Failed to load catalog: {err}"));
            }
        }
    }

    fn drain_notifications(&mut self) {
        let Some(rx) = self.notification_rx.as_mut() else {
            return;
        };
        while let Ok(notification) = rx.try_recv() {
            push_notification(&mut self.notifications, notification);
        }
    }

    async fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        if key.kind == KeyEventKind::Release {
            return Ok(());
        }
        let cart_len = self.store.len();
        match key.code {
            KeyCode::Char('q') if key.modifiers.is_empty() => self.state.should_quit = true,
            KeyCode::Char('c') if key.modifiers == KeyModifiers::CONTROL => {
                self.state.should_quit = true
            }
            KeyCode::Tab | KeyCode::BackTab => self.state.toggle_pane(),
            KeyCode::Char('j') | KeyCode::Down => self.state.move_cursor(1, cart_len),
            KeyCode::Char('k') | KeyCode::Up => self.state.move_cursor(-1, cart_len),
            KeyCode::Char('r') if key.modifiers.is_empty() => self.reload_catalog().await,
            _ => match self.state.pane {
                Pane::Catalog => self.handle_catalog_key(key).await,
                Pane::Cart => self.handle_cart_key(key).await,
            },
        }
        Ok(())
    }

    async fn handle_catalog_key(&mut self, key: KeyEvent) {
        if !matches!(key.code, KeyCode::Enter | KeyCode::Char('a')) {
            return;
        }
        let Some(product) = self.state.current_catalog_product().cloned() else {
            self.state.set_status("No product selected".to_string());
            return;
        };

        match self.store.add_product(product.id).await {
            Ok(()) => {
                let amount = self.store.item(product.id).map(|p| p.amount).unwrap_or(0);
                self.state
                    .set_status(format!("Added {} ({} in cart)", product.title, amount));
            }
            Err(_) => self.state.set_status("Cart unchanged".to_string()),
        }
    }

    async fn handle_cart_key(&mut self, key: KeyEvent) {
        let cart = self.store.cart();
        let Some(product) = cart.get(self.state.cart_cursor).cloned() else {
            self.state.set_status("Cart is empty".to_string());
            return;
        };

        match key.code {
            KeyCode::Char('+') | KeyCode::Char('=') => {
                self.change_amount(&product, i64::from(product.amount) + 1)
                    .await
            }
            KeyCode::Char('-') => {
                if product.amount <= 1 {
                    self.state
                        .set_status("Press d to remove the last unit".to_string());
                } else {
                    self.change_amount(&product, i64::from(product.amount) - 1)
                        .await
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => match self.store.remove_product(product.id) {
                Ok(()) => {
                    self.state.set_status(format!("Removed {}", product.title));
                    self.state.clamp_cart_cursor(self.store.len());
                }
                Err(_) => self.state.set_status("Cart unchanged".to_string()),
            },
            _ => {}
        }
    }

    async fn change_amount(&mut self, product: &Product, amount: i64) {
        let update = UpdateProductAmount {
            product_id: product.id,
            amount,
        };
        match self.store.update_product_amount(update).await {
            Ok(()) => self
                .state
                .set_status(format!("{} × {}", product.title, amount)),
            Err(_) => self.state.set_status("Cart unchanged".to_string()),
        }
    }

    fn draw(&mut self, frame: &mut Frame) {
        let size = frame.size();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Length(8),
                Constraint::Length(3),
            ])
            .split(size);

        let body_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[1]);

        self.render_header(frame, chunks[0]);
        self.render_catalog(frame, body_chunks[0]);
        self.render_cart(frame, body_chunks[1]);
        self.render_notifications(frame, chunks[2]);
        self.render_status(frame, chunks[3]);
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let line = Line::from(vec![
            Span::styled(
                "RocketShoes",
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(" · {}", self.api_url),
                Style::default().fg(self.theme.muted),
            ),
            Span::raw(format!(
                "   Cart: {} items ({} products)",
                self.store.total_items(),
                self.store.len()
            )),
        ]);
        let paragraph = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(paragraph, area);
    }

    fn render_catalog(&self, frame: &mut Frame, area: Rect) {
        let items: Vec<ListItem> = self
            .state
            .catalog
            .iter()
            .map(|product| {
                let in_cart = self
                    .store
                    .item(product.id)
                    .map(|entry| format!("  [{} in cart]", entry.amount))
                    .unwrap_or_default();
                ListItem::new(Line::from(vec![
                    Span::styled(
                        product.title.clone(),
                        Style::default()
                            .fg(self.theme.primary_fg)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(
                        format!("  {:.2}", product.price),
                        Style::default().fg(self.theme.muted),
                    ),
                    Span::styled(in_cart, Style::default().fg(self.theme.success)),
                ]))
            })
            .collect();

        let mut list_state = ListState::default();
        if !items.is_empty() {
            list_state.select(Some(self.state.catalog_cursor));
        }
        let list = List::new(items)
            .block(self.pane_block("Catalog", Pane::Catalog))
            .highlight_style(Style::default().bg(self.theme.selection_bg))
            .highlight_symbol("▶ ");
        frame.render_stateful_widget(list, area, &mut list_state);
    }

    fn render_cart(&self, frame: &mut Frame, area: Rect) {
        let cart = self.store.cart();
        let items: Vec<ListItem> = cart
            .iter()
            .map(|product| {
                ListItem::new(Line::from(vec![
                    Span::styled(
                        product.title.clone(),
                        Style::default().fg(self.theme.primary_fg),
                    ),
                    Span::styled(
                        format!("  × {}", product.amount),
                        Style::default()
                            .fg(self.theme.accent)
                            .add_modifier(Modifier::BOLD),
                    ),
                ]))
            })
            .collect();

        let mut list_state = ListState::default();
        if !items.is_empty() {
            list_state.select(Some(self.state.cart_cursor.min(items.len() - 1)));
        }
        let list = List::new(items)
            .block(self.pane_block("Cart", Pane::Cart))
            .highlight_style(Style::default().bg(self.theme.selection_bg))
            .highlight_symbol("▶ ");
        frame.render_stateful_widget(list, area, &mut list_state);
    }

    fn render_notifications(&self, frame: &mut Frame, area: Rect) {
        let lines: Vec<Line> = self
            .notifications
            .iter()
            .take(area.height.saturating_sub(2) as usize)
            .map(|notification| {
                let color = match notification.level {
                    NotificationLevel::Error => self.theme.danger,
                    NotificationLevel::Info => self.theme.success,
                };
                Line::from(vec![
                    Span::styled(
                        notification.raised_at.format("%H:%M:%S ").to_string(),
                        Style::default().fg(self.theme.muted),
                    ),
                    Span::styled(notification.message.clone(), Style::default().fg(color)),
                ])
            })
            .collect();
        let paragraph = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Notifications"))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Status");
        let help = match self.state.pane {
            Pane::Catalog => "Enter/a add · Tab cart · r reload · q quit",
            Pane::Cart => "+/- amount · d remove · Tab catalog · q quit",
        };
        let line = Line::from(vec![
            Span::raw(self.state.status.clone()),
            Span::styled(format!("   {help}"), Style::default().fg(self.theme.muted)),
        ]);
        let paragraph = Paragraph::new(line).block(block).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn pane_block(&self, title: &'static str, pane: Pane) -> Block<'static> {
        let style = if self.state.pane == pane {
            Style::default().fg(self.theme.accent)
        } else {
            Style::default()
        };
        Block::default()
            .borders(Borders::ALL)
            .border_style(style)
            .title(title)
    }
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor()?;
    Ok(())
}

fn spawn_input_thread(sender: mpsc::Sender<AppEvent>) {
    thread::spawn(move || loop {
        match event::poll(TICK_RATE) {
            Ok(true) => match event::read() {
                Ok(evt) => {
                    if sender.blocking_send(AppEvent::Input(evt)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            },
            Ok(false) => {
                if sender.blocking_send(AppEvent::Tick).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    });
}

struct UiState {
    catalog: Vec<CatalogProduct>,
    catalog_cursor: usize,
    cart_cursor: usize,
    pane: Pane,
    status: String,
    should_quit: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            catalog: Vec::new(),
            catalog_cursor: 0,
            cart_cursor: 0,
            pane: Pane::Catalog,
            status: "Ready".to_string(),
            should_quit: false,
        }
    }
}

impl UiState {
    fn set_catalog(&mut self, catalog: Vec<CatalogProduct>) {
        self.catalog = catalog;
        if self.catalog_cursor >= self.catalog.len() {
            self.catalog_cursor = self.catalog.len().saturating_sub(1);
        }
    }

    fn current_catalog_product(&self) -> Option<&CatalogProduct> {
        self.catalog.get(self.catalog_cursor)
    }

    fn toggle_pane(&mut self) {
        self.pane = match self.pane {
            Pane::Catalog => Pane::Cart,
            Pane::Cart => Pane::Catalog,
        };
    }

    fn move_cursor(&mut self, delta: isize, cart_len: usize) {
        let (cursor, len) = match self.pane {
            Pane::Catalog => (&mut self.catalog_cursor, self.catalog.len()),
            Pane::Cart => (&mut self.cart_cursor, cart_len),
        };
        if len == 0 {
            *cursor = 0;
            return;
        }
        let idx = (*cursor as isize + delta).clamp(0, len as isize - 1);
        *cursor = idx as usize;
    }

    fn clamp_cart_cursor(&mut self, cart_len: usize) {
        if self.cart_cursor >= cart_len {
            self.cart_cursor = cart_len.saturating_sub(1);
        }
    }

    fn set_status(&mut self, message: String) {
        self.status = message;
    }
}

/// Newest first, capped at [`MAX_NOTIFICATIONS`].
fn push_notification(feed: &mut Vec<Notification>, notification: Notification) {
    feed.insert(0, notification);
    feed.truncate(MAX_NOTIFICATIONS);
}

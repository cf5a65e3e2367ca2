use ratatui::{
    layout::{Alignment, Constraint, Direction as LayoutDirection, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Tabs, Wrap},
    Frame,
};
use tui_dispatch::{
    Component, EventContext, EventKind, EventRoutingState, HandlerResponse, RenderContext,
};
use tui_dispatch_components::style::BorderStyle;
use tui_dispatch_components::{
    BaseStyle, Padding, SelectList, SelectListBehavior, SelectListProps,
    SelectListStyle, SelectionStyle, StatusBar, StatusBarHint, StatusBarItem, StatusBarProps,
    StatusBarSection, StatusBarStyle,
};

use crate::action::Action;
use crate::navigation::{Direction, NavContext, ViewSource};
use crate::state::{AppState, OverlayTab, Record, StatKind};
use crate::view::{present, Presenter};

const BG_BASE: Color = Color::Rgb(12, 18, 28);
const BG_PANEL: Color = Color::Rgb(20, 32, 46);
const BG_PANEL_ALT: Color = Color::Rgb(26, 40, 58);
const BG_HIGHLIGHT: Color = Color::Rgb(28, 92, 110);
const TEXT_MAIN: Color = Color::Rgb(232, 242, 244);
const TEXT_DIM: Color = Color::Rgb(176, 195, 207);
const ACCENT_TEAL: Color = Color::Rgb(72, 204, 184);
const ACCENT_GOLD: Color = Color::Rgb(228, 176, 88);
const ACCENT_RED: Color = Color::Rgb(226, 92, 92);

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

#[derive(tui_dispatch::ComponentId, Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum CardsComponentId {
    Cards,
    Overlay,
    Search,
}

#[derive(tui_dispatch::BindingContext, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardsContext {
    Cards,
    Overlay,
    Search,
}

impl EventRoutingState<CardsComponentId, CardsContext> for AppState {
    fn focused(&self) -> Option<CardsComponentId> {
        self.modal().or(Some(CardsComponentId::Cards))
    }

    fn modal(&self) -> Option<CardsComponentId> {
        if self.search.editing {
            Some(CardsComponentId::Search)
        } else if self.overlay.is_some() {
            Some(CardsComponentId::Overlay)
        } else {
            None
        }
    }

    fn binding_context(&self, id: CardsComponentId) -> CardsContext {
        match id {
            CardsComponentId::Cards => CardsContext::Cards,
            CardsComponentId::Overlay => CardsContext::Overlay,
            CardsComponentId::Search => CardsContext::Search,
        }
    }

    fn default_context(&self) -> CardsContext {
        CardsContext::Cards
    }
}

pub struct CardsUi {
    card_list: SelectList,
    status_bar: StatusBar,
}

impl Default for CardsUi {
    fn default() -> Self {
        Self::new()
    }
}

impl CardsUi {
    pub fn new() -> Self {
        Self {
            card_list: SelectList::new(),
            status_bar: StatusBar::new(),
        }
    }

    pub fn render(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        state: &AppState,
        render_ctx: RenderContext,
        event_ctx: &mut EventContext<CardsComponentId>,
    ) {
        let layout = app_layout(area);
        event_ctx.set_component_area(CardsComponentId::Cards, layout[1]);
        if state.search.editing {
            event_ctx.set_component_area(CardsComponentId::Search, layout[0]);
        } else {
            event_ctx.component_areas.remove(&CardsComponentId::Search);
        }
        if state.overlay.is_some() {
            event_ctx.set_component_area(CardsComponentId::Overlay, overlay_area(area));
        } else {
            event_ctx.component_areas.remove(&CardsComponentId::Overlay);
        }
        self.draw(frame, area, state, render_ctx.is_focused());
    }

    /// Draws the whole screen without touching event routing.
    pub fn draw(&mut self, frame: &mut Frame, area: Rect, state: &AppState, is_focused: bool) {
        frame.render_widget(Block::default().style(Style::default().bg(BG_BASE)), area);
        let layout = app_layout(area);
        render_header(frame, layout[0], state);

        let body = Layout::default()
            .direction(LayoutDirection::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(1)])
            .split(layout[1]);
        let mut presenter = FramePresenter {
            frame: &mut *frame,
            screen: area,
            body: body[0],
            affordance: body[1],
            card_list: &mut self.card_list,
            view: state.view,
            is_focused: is_focused && state.overlay.is_none() && !state.search.editing,
        };
        present(state, &mut presenter);

        render_footer(frame, layout[2], state, &mut self.status_bar);
    }

    pub fn handle_cards_event(
        &mut self,
        event: &EventKind,
        state: &AppState,
    ) -> HandlerResponse<Action> {
        handle_cards_event(event, state, &mut self.card_list)
    }

    pub fn handle_overlay_event(
        &mut self,
        event: &EventKind,
        state: &AppState,
    ) -> HandlerResponse<Action> {
        handle_overlay_event(event, state)
    }

    pub fn handle_search_event(
        &mut self,
        event: &EventKind,
        state: &AppState,
    ) -> HandlerResponse<Action> {
        handle_search_event(event, state)
    }
}

fn app_layout(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(LayoutDirection::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(4),
            Constraint::Length(3),
        ])
        .split(area)
}

fn overlay_area(area: Rect) -> Rect {
    let width = area.width.saturating_sub(8).clamp(20, 72).min(area.width);
    let height = area.height.saturating_sub(4).clamp(10, 22).min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

pub fn handle_cards_event(
    event: &EventKind,
    state: &AppState,
    card_list: &mut SelectList,
) -> HandlerResponse<Action> {
    let actions = match event {
        EventKind::Key(key) => match key.code {
            crossterm::event::KeyCode::Enter => vec![Action::OverlayOpen(state.selected)],
            crossterm::event::KeyCode::Char('m') => match state.view {
                ViewSource::Loaded => vec![Action::PageLoadMore],
                ViewSource::Filtered => vec![Action::SearchShowMore],
            },
            crossterm::event::KeyCode::Char('r') if state.load_error.is_some() => {
                vec![Action::PageReload]
            }
            crossterm::event::KeyCode::Esc if !state.search.query.is_empty() => {
                vec![Action::SearchCancel]
            }
            crossterm::event::KeyCode::PageDown => vec![Action::SelectionMove(10)],
            crossterm::event::KeyCode::PageUp => vec![Action::SelectionMove(-10)],
            _ => {
                let items = card_lines(state.visible_records());
                let props = SelectListProps {
                    items: &items,
                    count: items.len(),
                    selected: state.selected.min(items.len().saturating_sub(1)),
                    is_focused: true,
                    style: card_list_style(),
                    behavior: SelectListBehavior {
                        show_scrollbar: true,
                        wrap_navigation: false,
                    },
                    on_select: Action::SelectionSet,
                    render_item: &|item| item.clone(),
                };
                let actions: Vec<_> = card_list.handle_event(event, props).into_iter().collect();
                return handler_response(actions);
            }
        },
        EventKind::Scroll { delta, .. } => vec![Action::SelectionMove((*delta * 3) as i16)],
        _ => vec![],
    };
    handler_response(actions)
}

pub fn handle_overlay_event(event: &EventKind, _state: &AppState) -> HandlerResponse<Action> {
    let actions = match event {
        EventKind::Key(key) => match key.code {
            crossterm::event::KeyCode::Esc | crossterm::event::KeyCode::Enter => {
                vec![Action::OverlayClose]
            }
            crossterm::event::KeyCode::Left | crossterm::event::KeyCode::Char('h') => {
                vec![Action::OverlayStep(Direction::Back)]
            }
            crossterm::event::KeyCode::Right | crossterm::event::KeyCode::Char('l') => {
                vec![Action::OverlayStep(Direction::Forward)]
            }
            crossterm::event::KeyCode::Tab => vec![Action::OverlayTabNext],
            crossterm::event::KeyCode::BackTab => vec![Action::OverlayTabPrev],
            _ => vec![],
        },
        _ => vec![],
    };
    handler_response(actions)
}

pub fn handle_search_event(event: &EventKind, _state: &AppState) -> HandlerResponse<Action> {
    let actions = match event {
        EventKind::Key(key) => match key.code {
            crossterm::event::KeyCode::Esc => vec![Action::SearchCancel],
            crossterm::event::KeyCode::Enter => vec![Action::SearchSubmit],
            crossterm::event::KeyCode::Backspace => vec![Action::SearchBackspace],
            crossterm::event::KeyCode::Char(ch) => vec![Action::SearchInput(ch)],
            _ => vec![],
        },
        _ => vec![],
    };
    handler_response(actions)
}

fn handler_response(actions: Vec<Action>) -> HandlerResponse<Action> {
    if actions.is_empty() {
        HandlerResponse::ignored()
    } else {
        HandlerResponse {
            actions,
            consumed: true,
            needs_render: false,
        }
    }
}

struct FramePresenter<'a, 'f> {
    frame: &'a mut Frame<'f>,
    screen: Rect,
    body: Rect,
    affordance: Rect,
    card_list: &'a mut SelectList,
    view: ViewSource,
    is_focused: bool,
}

impl FramePresenter<'_, '_> {
    fn body_block(&self) -> Block<'static> {
        let title = match self.view {
            ViewSource::Loaded => "CARDS",
            ViewSource::Filtered => "RESULTS",
        };
        let border = if self.is_focused { ACCENT_TEAL } else { TEXT_DIM };
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN))
            .border_style(Style::default().fg(border))
    }

    fn render_notice(&mut self, text: Text<'static>) {
        let paragraph = Paragraph::new(text)
            .block(self.body_block())
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        self.frame.render_widget(paragraph, self.body);
    }
}

impl Presenter for FramePresenter<'_, '_> {
    fn render_list(&mut self, records: &[Record], selected: usize) {
        let block = self.body_block();
        let inner = block.inner(self.body);
        self.frame.render_widget(block, self.body);

        let items = card_lines(records);
        let props = SelectListProps {
            items: &items,
            count: items.len(),
            selected: selected.min(items.len().saturating_sub(1)),
            is_focused: self.is_focused,
            style: card_list_style(),
            behavior: SelectListBehavior {
                show_scrollbar: true,
                wrap_navigation: false,
            },
            on_select: Action::SelectionSet,
            render_item: &|item| item.clone(),
        };
        self.card_list.render(&mut *self.frame, inner, props);
    }

    fn render_overlay(&mut self, record: &Record, nav: NavContext, tab: OverlayTab) {
        render_overlay(self.frame, overlay_area(self.screen), record, nav, tab);
    }

    fn render_error(&mut self, message: &str) {
        self.render_notice(Text::from(vec![
            Line::from(""),
            Line::from(Span::styled(
                message.to_string(),
                Style::default().fg(ACCENT_RED).add_modifier(Modifier::BOLD),
            )),
        ]));
    }

    fn render_empty(&mut self) {
        let text = match self.view {
            ViewSource::Loaded => "No Pokémon loaded.",
            ViewSource::Filtered => "No Pokémon found.",
        };
        self.render_notice(Text::from(vec![
            Line::from(""),
            Line::from(Span::styled(text, Style::default().fg(TEXT_DIM))),
        ]));
    }

    fn render_load_more_affordance(&mut self, visible: bool) {
        if !visible {
            return;
        }
        let label = match self.view {
            ViewSource::Loaded => "load more",
            ViewSource::Filtered => "show more",
        };
        let line = Line::from(vec![
            Span::styled(
                "[m] ",
                Style::default().fg(ACCENT_TEAL).add_modifier(Modifier::BOLD),
            ),
            Span::styled(label, Style::default().fg(TEXT_DIM)),
        ]);
        self.frame.render_widget(
            Paragraph::new(line)
                .alignment(Alignment::Center)
                .style(Style::default().bg(BG_BASE)),
            self.affordance,
        );
    }
}

fn render_header(frame: &mut Frame, area: Rect, state: &AppState) {
    let title_style = Style::default()
        .fg(ACCENT_TEAL)
        .add_modifier(Modifier::BOLD);
    let search = if state.search.editing {
        format!("/{}_", state.search.query)
    } else if state.search.query.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", state.search.query)
    };
    let scope = match state.view {
        ViewSource::Loaded => format!("{} loaded", state.loaded.len()),
        ViewSource::Filtered => format!(
            "{} of {} results",
            state.revealed_search_results().len(),
            state.search.results.len()
        ),
    };
    let line = Line::from(vec![
        Span::styled("POKECARDS", title_style),
        Span::raw("  |  "),
        Span::styled(scope, Style::default().fg(ACCENT_GOLD)),
        Span::raw("  |  Search: "),
        Span::styled(search, Style::default().fg(ACCENT_TEAL)),
    ]);

    let border = if state.search.editing {
        ACCENT_TEAL
    } else {
        TEXT_DIM
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN))
        .border_style(Style::default().fg(border));
    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn render_overlay(frame: &mut Frame, area: Rect, record: &Record, nav: NavContext, tab: OverlayTab) {
    frame.render_widget(Clear, area);
    let title = format!(
        "#{:03} {}  ({}/{})",
        record.id,
        record.name.to_ascii_uppercase(),
        nav.index + 1,
        nav.count
    );
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .style(Style::default().bg(BG_PANEL_ALT).fg(TEXT_MAIN))
        .border_style(Style::default().fg(type_color(record.primary_type())));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let layout = Layout::default()
        .direction(LayoutDirection::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(inner);

    let tabs = Tabs::new(vec!["Main", "Stats", "Evolution"])
        .select(tab.index())
        .style(Style::default().fg(TEXT_DIM))
        .highlight_style(
            Style::default()
                .fg(ACCENT_TEAL)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(tabs, layout[0]);

    let content = match tab {
        OverlayTab::Main => main_text(record),
        OverlayTab::Stats => stats_text(record),
        OverlayTab::Evolution => evolution_text(record),
    };
    frame.render_widget(
        Paragraph::new(content)
            .style(Style::default().fg(TEXT_MAIN))
            .wrap(Wrap { trim: true }),
        layout[1],
    );

    let nav_line = if nav.can_step() {
        Line::from(vec![
            Span::styled("<- h", Style::default().fg(ACCENT_TEAL)),
            Span::raw("   "),
            Span::styled("l ->", Style::default().fg(ACCENT_TEAL)),
        ])
    } else {
        Line::from("")
    };
    frame.render_widget(
        Paragraph::new(nav_line).alignment(Alignment::Center),
        layout[2],
    );
}

fn main_text(record: &Record) -> Text<'static> {
    let label = Style::default().fg(ACCENT_GOLD);
    let field = |name: &'static str, value: String| {
        Line::from(vec![Span::styled(format!("{name:<10}"), label), Span::raw(value)])
    };
    Text::from(vec![
        Line::from(type_spans(&record.types)),
        Line::from(""),
        field("Height", format!("{:.1} m", record.height as f32 / 10.0)),
        field("Weight", format!("{:.1} kg", record.weight as f32 / 10.0)),
        field("Base XP", record.base_experience.to_string()),
        field("Abilities", join_or_dash(&record.abilities)),
        field("Moves", join_or_dash(&record.first_moves)),
        field(
            "Image",
            if record.image_url.is_empty() {
                "-".to_string()
            } else {
                record.image_url.clone()
            },
        ),
    ])
}

fn stats_text(record: &Record) -> Text<'static> {
    let lines = StatKind::ALL
        .iter()
        .map(|kind| Line::from(render_stat(kind.label(), record.stat(*kind))))
        .collect::<Vec<_>>();
    Text::from(lines)
}

fn render_stat(label: &str, value: u32) -> String {
    let bar_len = (value as usize / 10).clamp(1, 20);
    let bar = "#".repeat(bar_len);
    format!("{label:>8} {value:>3} {bar}")
}

fn evolution_text(record: &Record) -> Text<'static> {
    let Some(evolution) = &record.evolution else {
        return Text::from(Line::from(Span::styled(
            "No evolution data.",
            Style::default().fg(TEXT_DIM),
        )));
    };
    let stages = evolution.stages();
    let mut chain = Vec::new();
    for (idx, (name, _)) in stages.iter().enumerate() {
        if idx > 0 {
            chain.push(Span::styled("  ->  ", Style::default().fg(TEXT_DIM)));
        }
        let style = if *name == record.name {
            Style::default().fg(ACCENT_TEAL).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(TEXT_MAIN)
        };
        chain.push(Span::styled(name.to_string(), style));
    }

    let mut lines = vec![Line::from(chain), Line::from("")];
    lines.extend(stages.iter().map(|(name, image)| {
        let image = if image.is_empty() { "-" } else { *image };
        Line::from(vec![
            Span::styled(format!("{name:<12}"), Style::default().fg(ACCENT_GOLD)),
            Span::raw(image.to_string()),
        ])
    }));
    Text::from(lines)
}

fn render_footer(frame: &mut Frame, area: Rect, state: &AppState, status_bar: &mut StatusBar) {
    let status = status_text(state);
    let (left_hints, center_hints) = status_hints(state);
    let status_span = Span::styled(status.as_str(), Style::default().fg(ACCENT_GOLD));
    let status_items = [StatusBarItem::span(status_span)];

    let style = StatusBarStyle {
        base: BaseStyle {
            border: Some(BorderStyle {
                borders: Borders::ALL,
                style: Style::default().fg(TEXT_DIM),
                focused_style: Some(Style::default().fg(ACCENT_TEAL)),
            }),
            padding: Padding::xy(1, 0),
            bg: Some(BG_PANEL),
            fg: Some(TEXT_MAIN),
        },
        text: Style::default().fg(TEXT_DIM),
        hint_key: Style::default()
            .fg(ACCENT_TEAL)
            .add_modifier(Modifier::BOLD),
        hint_label: Style::default().fg(TEXT_DIM),
        separator: Style::default().fg(TEXT_DIM),
    };

    let props = StatusBarProps {
        left: StatusBarSection::hints(&left_hints).with_separator("  "),
        center: StatusBarSection::hints(&center_hints).with_separator("  "),
        right: StatusBarSection::items(&status_items).with_separator("  "),
        style,
        is_focused: false,
    };
    Component::<Action>::render(status_bar, frame, area, props);
}

fn status_text(state: &AppState) -> String {
    let spinner = SPINNER[(state.tick % SPINNER.len() as u64) as usize];
    if state.page_loading {
        format!("{spinner} Loading cards...")
    } else if state.universe.is_loading() {
        format!("{spinner} Indexing names...")
    } else if state.search.loading {
        format!("{spinner} Searching...")
    } else if let Some(error) = &state.search.error {
        error.clone()
    } else {
        state.message.clone().unwrap_or_default()
    }
}

fn status_hints(state: &AppState) -> (Vec<StatusBarHint<'static>>, Vec<StatusBarHint<'static>>) {
    if state.search.editing {
        let left = vec![
            StatusBarHint::new("Enter", "Done"),
            StatusBarHint::new("Esc", "Cancel"),
            StatusBarHint::new("Bksp", "Delete"),
        ];
        return (left, Vec::new());
    }

    if state.overlay.is_some() {
        let left = vec![
            StatusBarHint::new("h/l", "Prev/Next"),
            StatusBarHint::new("Tab", "Section"),
            StatusBarHint::new("Esc", "Close"),
        ];
        return (left, vec![StatusBarHint::new("q", "Quit")]);
    }

    let mut left = vec![
        StatusBarHint::new("j/k", "Move"),
        StatusBarHint::new("Enter", "Open"),
        StatusBarHint::new("m", "More"),
    ];
    if state.load_error.is_some() {
        left.push(StatusBarHint::new("r", "Reload"));
    }
    if !state.search.query.is_empty() {
        left.push(StatusBarHint::new("Esc", "Clear"));
    }
    let center = vec![
        StatusBarHint::new("/", "Search"),
        StatusBarHint::new("q", "Quit"),
    ];
    (left, center)
}

fn card_list_style() -> SelectListStyle {
    SelectListStyle {
        base: BaseStyle {
            border: None,
            padding: Padding::xy(1, 0),
            bg: None,
            fg: Some(TEXT_MAIN),
        },
        selection: SelectionStyle {
            style: Some(
                Style::default()
                    .bg(BG_HIGHLIGHT)
                    .fg(TEXT_MAIN)
                    .add_modifier(Modifier::BOLD),
            ),
            marker: None,
            disabled: false,
        },
        ..SelectListStyle::default()
    }
}

fn card_lines(records: &[Record]) -> Vec<Line<'static>> {
    records
        .iter()
        .map(|record| {
            let mut spans = vec![
                Span::styled(format!("#{:03} ", record.id), Style::default().fg(TEXT_DIM)),
                Span::styled(format!("{:<14}", record.name), Style::default().fg(TEXT_MAIN)),
            ];
            spans.extend(type_spans(&record.types));
            Line::from(spans)
        })
        .collect()
}

fn type_spans(types: &[String]) -> Vec<Span<'static>> {
    types
        .iter()
        .map(|name| {
            Span::styled(
                format!(" {} ", name.to_ascii_uppercase()),
                Style::default()
                    .fg(type_color(Some(name.as_str())))
                    .add_modifier(Modifier::BOLD),
            )
        })
        .collect()
}

fn type_color(name: Option<&str>) -> Color {
    match name.unwrap_or_default() {
        "fire" => Color::Rgb(240, 128, 48),
        "water" => Color::Rgb(104, 144, 240),
        "grass" => Color::Rgb(120, 200, 80),
        "electric" => Color::Rgb(248, 208, 48),
        "ice" => Color::Rgb(152, 216, 216),
        "fighting" => Color::Rgb(192, 48, 40),
        "poison" => Color::Rgb(160, 64, 160),
        "ground" => Color::Rgb(224, 192, 104),
        "flying" => Color::Rgb(168, 144, 240),
        "psychic" => Color::Rgb(248, 88, 136),
        "bug" => Color::Rgb(168, 184, 32),
        "rock" => Color::Rgb(184, 160, 56),
        "ghost" => Color::Rgb(112, 88, 152),
        "dragon" => Color::Rgb(112, 56, 248),
        "dark" => Color::Rgb(112, 88, 72),
        "steel" => Color::Rgb(184, 184, 208),
        "fairy" => Color::Rgb(238, 153, 172),
        _ => TEXT_DIM,
    }
}

fn join_or_dash(values: &[String]) -> String {
    if values.is_empty() {
        "-".to_string()
    } else {
        values.join(", ")
    }
}

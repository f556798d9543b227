//! Common test utilities: a scripted grid widget, counting header widgets
//! and a harness driving the engine on a manual clock.
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation
)]

use std::cell::RefCell;
use std::collections::{HashSet, VecDeque};
use std::rc::Rc;

use gridsync::headers::{HeaderFactory, HeaderHandle};
use gridsync::schedule::{Clock, ManualClock};
use gridsync::tooltip::{TextMeasurer, TextSize};
use gridsync::viewport::{CellBox, GridWidget, Modifiers, RowRange, WidgetEvent};
use gridsync::{
    ColumnDefinition, ColumnMetadata, DataPage, GridConfig, GridEngine, GridError, GridEvent,
    Result, Row,
};

// ============================================================================
// Scripted grid widget
// ============================================================================

/// Everything the engine did to the widget, plus what the widget will report.
#[derive(Debug, Default)]
pub struct WidgetLog {
    /// Method names, in call order.
    pub calls: Vec<&'static str>,
    /// Column ids of every `apply_columns` call.
    pub applied: Vec<Vec<String>>,
    /// `(id, css_class)` of the last `update_column_classes` call.
    pub classes: Vec<(String, Option<String>)>,
    pub invalidated_rows: Vec<usize>,
    pub scrolled_to: Option<usize>,
    pub active_cell: Option<(usize, usize)>,
    /// Current visual order of the grid.
    pub columns: Vec<String>,
    /// Header cells whose DOM node is gone when rendered.
    pub missing_targets: HashSet<String>,
    pub cell_box: Option<CellBox>,
    pub range: RowRange,
    pub queue: VecDeque<WidgetEvent<bool>>,
}

impl WidgetLog {
    pub fn count(&self, call: &str) -> usize {
        self.calls.iter().filter(|c| **c == call).count()
    }
}

/// Widget that behaves like the real grid: a relayout destroys every header
/// cell, then renders one per column, all within the call.
pub struct FakeWidget {
    log: Rc<RefCell<WidgetLog>>,
}

impl FakeWidget {
    pub fn new() -> (Self, Rc<RefCell<WidgetLog>>) {
        let log = Rc::new(RefCell::new(WidgetLog::default()));
        (
            Self {
                log: Rc::clone(&log),
            },
            log,
        )
    }
}

impl GridWidget for FakeWidget {
    type HeaderTarget = bool;

    fn apply_columns(&mut self, columns: &[ColumnDefinition]) {
        let mut log = self.log.borrow_mut();
        log.calls.push("apply_columns");
        let previous = std::mem::take(&mut log.columns);
        for id in previous {
            log.queue
                .push_back(WidgetEvent::HeaderDestroyRequested { column_id: id });
        }
        for column in columns {
            let connected = !log.missing_targets.contains(&column.id);
            log.queue.push_back(WidgetEvent::HeaderRendered {
                column_id: column.id.clone(),
                target: connected,
            });
            log.columns.push(column.id.clone());
        }
        log.applied
            .push(columns.iter().map(|c| c.id.clone()).collect());
    }

    fn update_column_classes(&mut self, columns: &[ColumnDefinition]) {
        let mut log = self.log.borrow_mut();
        log.calls.push("update_column_classes");
        log.classes = columns
            .iter()
            .map(|c| (c.id.clone(), c.css_class.clone()))
            .collect();
    }

    fn invalidate(&mut self) {
        self.log.borrow_mut().calls.push("invalidate");
    }

    fn invalidate_rows(&mut self, rows: &[usize]) {
        let mut log = self.log.borrow_mut();
        log.calls.push("invalidate_rows");
        log.invalidated_rows = rows.to_vec();
    }

    fn update_row_count(&mut self) {
        self.log.borrow_mut().calls.push("update_row_count");
    }

    fn render(&mut self) {
        self.log.borrow_mut().calls.push("render");
    }

    fn resize_canvas(&mut self) {
        self.log.borrow_mut().calls.push("resize_canvas");
    }

    fn scroll_row_to_top(&mut self, row: usize) {
        let mut log = self.log.borrow_mut();
        log.calls.push("scroll_row_to_top");
        log.scrolled_to = Some(row);
    }

    fn column_ids(&self) -> Vec<String> {
        self.log.borrow().columns.clone()
    }

    fn visible_row_range(&self) -> RowRange {
        self.log.borrow().range
    }

    fn scroll_cell_into_view(&mut self, _row: usize, _cell: usize) {
        self.log.borrow_mut().calls.push("scroll_cell_into_view");
    }

    /// Like the real grid, moving the active cell notifies listeners.
    fn set_active_cell(&mut self, row: usize, cell: usize) {
        let mut log = self.log.borrow_mut();
        log.calls.push("set_active_cell");
        log.active_cell = Some((row, cell));
        log.queue
            .push_back(WidgetEvent::ActiveCellChanged { row, cell });
    }

    fn cell_box(&self, _row: usize, _cell: usize) -> Option<CellBox> {
        self.log.borrow().cell_box
    }

    fn drain_events(&mut self) -> Vec<WidgetEvent<bool>> {
        self.log.borrow_mut().queue.drain(..).collect()
    }
}

// ============================================================================
// Counting header widgets
// ============================================================================

#[derive(Debug, Default)]
pub struct HeaderLog {
    /// Ids of created widgets, in creation order (`tdpId` for the index).
    pub created: Vec<String>,
    pub disposed: Vec<String>,
    pub attached: usize,
    pub detached: usize,
    /// Last bound column name per widget id.
    pub bound: Vec<(String, String)>,
}

pub struct FakeHeader {
    id: String,
    log: Rc<RefCell<HeaderLog>>,
}

impl HeaderHandle for FakeHeader {
    type Target = bool;

    fn bind(&mut self, metadata: Option<&ColumnMetadata>) {
        if let Some(metadata) = metadata {
            self.log
                .borrow_mut()
                .bound
                .push((self.id.clone(), metadata.name.clone()));
        }
    }

    fn attach(&mut self, target: &bool) -> Result<()> {
        if !*target {
            return Err(GridError::RenderTargetMissing {
                column_id: self.id.clone(),
            });
        }
        self.log.borrow_mut().attached += 1;
        Ok(())
    }

    fn detach(&mut self) {
        self.log.borrow_mut().detached += 1;
    }

    fn dispose(self) {
        self.log.borrow_mut().disposed.push(self.id);
    }
}

pub struct FakeHeaderFactory {
    log: Rc<RefCell<HeaderLog>>,
}

impl FakeHeaderFactory {
    pub fn new() -> (Self, Rc<RefCell<HeaderLog>>) {
        let log = Rc::new(RefCell::new(HeaderLog::default()));
        (
            Self {
                log: Rc::clone(&log),
            },
            log,
        )
    }

    fn header(&self, id: &str) -> FakeHeader {
        self.log.borrow_mut().created.push(id.to_string());
        FakeHeader {
            id: id.to_string(),
            log: Rc::clone(&self.log),
        }
    }
}

impl HeaderFactory for FakeHeaderFactory {
    type Handle = FakeHeader;

    fn create_column_header(&mut self, metadata: &ColumnMetadata) -> Result<FakeHeader> {
        Ok(self.header(&metadata.id))
    }

    fn create_index_header(&mut self) -> Result<FakeHeader> {
        Ok(self.header(gridsync::INDEX_ID))
    }
}

/// 7px per character, 14px per line.
pub struct FixedMeasurer;

impl TextMeasurer for FixedMeasurer {
    fn measure(&self, text: &str) -> TextSize {
        let longest = text.lines().map(|l| l.chars().count()).max().unwrap_or(0);
        TextSize {
            width: 7.0 * longest as f32,
            height: 14.0 * text.lines().count().max(1) as f32,
        }
    }
}

// ============================================================================
// Fixtures
// ============================================================================

/// Two columns, one record.
pub fn two_column_page() -> DataPage {
    DataPage::new(
        vec![
            ColumnMetadata::new("0000", "firstname", "string"),
            ColumnMetadata::new("0001", "lastname", "string"),
        ],
        vec![Row::new()
            .with("tdpId", 0)
            .with("0000", "a")
            .with("0001", "b")],
    )
}

/// Four columns (`0000`..`0003`), `rows` records.
pub fn wide_page(rows: u64) -> DataPage {
    let columns = vec![
        ColumnMetadata::new("0000", "id", "integer"),
        ColumnMetadata::new("0001", "city", "string"),
        ColumnMetadata::new("0002", "country", "string"),
        ColumnMetadata::new("0003", "population", "double"),
    ];
    let cities = ["Paris", "Lyon", "Nantes"];
    let records = (0..rows)
        .map(|i| {
            let city = cities[(i % 3) as usize];
            Row::new()
                .with("tdpId", i)
                .with("0000", i)
                .with("0001", city)
                .with("0002", "France")
                .with("0003", 1000.5)
        })
        .collect();
    DataPage::new(columns, records)
}

// ============================================================================
// Engine harness
// ============================================================================

pub type TestEngine = GridEngine<FakeWidget, FakeHeaderFactory>;

pub struct Harness {
    pub engine: TestEngine,
    pub clock: ManualClock,
    pub widget: Rc<RefCell<WidgetLog>>,
    pub headers: Rc<RefCell<HeaderLog>>,
    pub events: Rc<RefCell<Vec<GridEvent>>>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(GridConfig::default())
    }

    pub fn with_config(config: GridConfig) -> Self {
        Self::build(config, |engine| engine)
    }

    /// Harness whose engine went through `setup` (width store, templates).
    pub fn build(config: GridConfig, setup: impl FnOnce(TestEngine) -> TestEngine) -> Self {
        let clock = ManualClock::new();
        let (widget, widget_log) = FakeWidget::new();
        let (factory, header_log) = FakeHeaderFactory::new();
        let engine = GridEngine::new(
            config,
            widget,
            factory,
            Rc::new(clock.clone()),
            Box::new(FixedMeasurer),
        )
        .expect("valid config");
        let mut engine = setup(engine);
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        engine.subscribe(move |event| sink.borrow_mut().push(event.clone()));
        Self {
            engine,
            clock,
            widget: widget_log,
            headers: header_log,
            events,
        }
    }

    /// Load `page` and let the column rebuild run.
    pub fn loaded(page: DataPage) -> Self {
        let mut harness = Self::new();
        harness.load(page);
        harness
    }

    pub fn load(&mut self, page: DataPage) {
        self.engine.load_page(page, None).expect("load page");
        self.settle();
    }

    /// Move the clock forward by `ms` and run what became due.
    pub fn advance(&mut self, ms: f64) -> usize {
        self.clock.advance(ms);
        self.engine.tick().expect("tick")
    }

    /// Run every pending task, following deadlines.
    pub fn settle(&mut self) {
        while let Some(deadline) = self.engine.next_deadline() {
            if deadline > self.clock.now_ms() {
                self.clock.set(deadline);
            }
            self.engine.tick().expect("tick");
        }
    }

    /// Deliver a widget notification the way the host does.
    pub fn send(&mut self, event: WidgetEvent<bool>) -> Result<()> {
        self.widget.borrow_mut().queue.push_back(event);
        self.engine.process_widget_events()
    }

    pub fn click(&mut self, column_id: &str, modifiers: Modifiers) {
        self.send(WidgetEvent::HeaderClicked {
            column_id: column_id.to_string(),
            modifiers,
        })
        .expect("header click");
    }

    pub fn selected(&self) -> Vec<String> {
        self.engine
            .selection()
            .selected_ids()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    pub fn take_events(&self) -> Vec<GridEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }
}

pub const CTRL: Modifiers = Modifiers {
    ctrl: true,
    shift: false,
};

pub const SHIFT: Modifiers = Modifiers {
    ctrl: false,
    shift: true,
};

pub const PLAIN: Modifiers = Modifiers {
    ctrl: false,
    shift: false,
};

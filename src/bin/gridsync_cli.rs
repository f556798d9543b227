//! CLI tool for gridsync - loads a data page headlessly and prints the grid
//!
//! Usage:
//!   gridsync_cli <page.json>                          # Columns and first rows
//!   gridsync_cli <page.json> --select 0001            # Select a column
//!   gridsync_cli <page.json> --highlight 0001=Paris   # Highlight matching cells
//!   gridsync_cli <page.json> --rows 50 --dataset ds-1
//!
//! Logging is controlled with `RUST_LOG` (e.g. `RUST_LOG=gridsync=debug`).

#![allow(clippy::exit)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::indexing_slicing)]

use std::env;
use std::fs;
use std::rc::Rc;

use gridsync::headers::{HeaderFactory, HeaderHandle};
use gridsync::schedule::ManualClock;
use gridsync::tooltip::{TextMeasurer, TextSize};
use gridsync::viewport::{CellBox, GridWidget, RowRange, WidgetEvent};
use gridsync::{ColumnDefinition, ColumnMetadata, DataPage, GridConfig, GridEngine};

/// Grid without a screen: keeps the column order and reports header renders.
#[derive(Default)]
struct HeadlessGrid {
    columns: Vec<String>,
    rows_shown: usize,
    queue: Vec<WidgetEvent<()>>,
}

impl GridWidget for HeadlessGrid {
    type HeaderTarget = ();

    fn apply_columns(&mut self, columns: &[ColumnDefinition]) {
        for id in self.columns.drain(..) {
            self.queue.push(WidgetEvent::HeaderDestroyRequested { column_id: id });
        }
        for column in columns {
            self.columns.push(column.id.clone());
            self.queue.push(WidgetEvent::HeaderRendered {
                column_id: column.id.clone(),
                target: (),
            });
        }
    }

    fn update_column_classes(&mut self, _columns: &[ColumnDefinition]) {}

    fn invalidate(&mut self) {}

    fn invalidate_rows(&mut self, _rows: &[usize]) {}

    fn update_row_count(&mut self) {}

    fn render(&mut self) {}

    fn resize_canvas(&mut self) {}

    fn scroll_row_to_top(&mut self, _row: usize) {}

    fn column_ids(&self) -> Vec<String> {
        self.columns.clone()
    }

    fn visible_row_range(&self) -> RowRange {
        RowRange {
            top: 0,
            bottom: self.rows_shown.saturating_sub(1),
        }
    }

    fn scroll_cell_into_view(&mut self, _row: usize, _cell: usize) {}

    fn set_active_cell(&mut self, _row: usize, _cell: usize) {}

    fn cell_box(&self, _row: usize, _cell: usize) -> Option<CellBox> {
        None
    }

    fn drain_events(&mut self) -> Vec<WidgetEvent<()>> {
        std::mem::take(&mut self.queue)
    }
}

/// Header that only remembers its label.
struct TextHeader {
    label: String,
}

impl HeaderHandle for TextHeader {
    type Target = ();

    fn bind(&mut self, metadata: Option<&ColumnMetadata>) {
        if let Some(metadata) = metadata {
            self.label.clone_from(&metadata.name);
        }
    }

    fn attach(&mut self, _target: &()) -> gridsync::Result<()> {
        Ok(())
    }

    fn detach(&mut self) {}

    fn dispose(self) {}
}

struct TextHeaders;

impl HeaderFactory for TextHeaders {
    type Handle = TextHeader;

    fn create_column_header(&mut self, metadata: &ColumnMetadata) -> gridsync::Result<TextHeader> {
        Ok(TextHeader {
            label: metadata.name.clone(),
        })
    }

    fn create_index_header(&mut self) -> gridsync::Result<TextHeader> {
        Ok(TextHeader {
            label: String::from("#"),
        })
    }
}

/// 7px per character, 14px per line.
struct FixedWidthText;

impl TextMeasurer for FixedWidthText {
    #[allow(clippy::cast_precision_loss)]
    fn measure(&self, text: &str) -> TextSize {
        let longest = text.lines().map(|l| l.chars().count()).max().unwrap_or(0);
        TextSize {
            width: 7.0 * longest as f32,
            height: 14.0 * text.lines().count().max(1) as f32,
        }
    }
}

struct Options {
    input: String,
    dataset: Option<String>,
    select: Option<String>,
    highlight: Option<(String, String)>,
    rows: usize,
}

fn usage() -> ! {
    eprintln!(
        "Usage: gridsync_cli <page.json> [--dataset ID] [--select COLUMN] \
         [--highlight COLUMN=VALUE] [--rows N]"
    );
    std::process::exit(1);
}

fn parse_args(args: &[String]) -> Options {
    if args.len() < 2 {
        usage();
    }
    let mut options = Options {
        input: args[1].clone(),
        dataset: None,
        select: None,
        highlight: None,
        rows: 20,
    };
    let mut rest = args[2..].iter();
    while let Some(flag) = rest.next() {
        let Some(value) = rest.next() else {
            usage();
        };
        match flag.as_str() {
            "--dataset" => options.dataset = Some(value.clone()),
            "--select" => options.select = Some(value.clone()),
            "--highlight" => {
                let Some((column, text)) = value.split_once('=') else {
                    usage();
                };
                options.highlight = Some((column.to_string(), text.to_string()));
            }
            "--rows" => options.rows = value.parse().unwrap_or_else(|_| usage()),
            _ => usage(),
        }
    }
    options
}

#[cfg(not(target_arch = "wasm32"))]
fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_filter(filter);
    tracing_subscriber::registry().with(console_layer).init();
}

#[cfg(target_arch = "wasm32")]
fn init_tracing() {}

fn main() {
    init_tracing();
    let args: Vec<String> = env::args().collect();
    let options = parse_args(&args);

    // Read input file
    let data = match fs::read_to_string(&options.input) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Error reading {}: {}", options.input, e);
            std::process::exit(1);
        }
    };

    let page: DataPage = match serde_json::from_str(&data) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error parsing data page: {}", e);
            std::process::exit(1);
        }
    };

    let clock = ManualClock::new();
    let grid = HeadlessGrid {
        rows_shown: options.rows,
        ..HeadlessGrid::default()
    };
    let mut engine = match GridEngine::new(
        GridConfig::default(),
        grid,
        TextHeaders,
        Rc::new(clock.clone()),
        Box::new(FixedWidthText),
    ) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Error creating engine: {}", e);
            std::process::exit(1);
        }
    };
    engine.subscribe(|event| {
        tracing::info!("{}", serde_json::to_string(event).unwrap_or_default());
    });

    if let Err(e) = engine.load_page(page, options.dataset.clone()) {
        eprintln!("Error loading page: {}", e);
        std::process::exit(1);
    }
    // Let the deferred column rebuild run.
    settle(&mut engine, &clock);

    if let Some(column) = &options.select {
        if let Err(e) = engine.select_column(column) {
            eprintln!("Error selecting column: {}", e);
            std::process::exit(1);
        }
    }
    if let Some((column, value)) = &options.highlight {
        engine.highlight_cells_containing(column, value);
    }
    settle(&mut engine, &clock);

    print_columns(&engine);
    print_rows(&engine, options.rows);
}

/// Advance the clock past every pending deadline.
fn settle(engine: &mut GridEngine<HeadlessGrid, TextHeaders>, clock: &ManualClock) {
    while let Some(deadline) = engine.next_deadline() {
        clock.set(deadline);
        if let Err(e) = engine.tick() {
            eprintln!("Warning: {}", e);
        }
    }
}

fn print_columns(engine: &GridEngine<HeadlessGrid, TextHeaders>) {
    println!("{:<8} {:<24} {:<10} {:<18} {:>6}", "ID", "NAME", "TYPE", "CLASS", "WIDTH");
    for column in engine.viewport().columns() {
        println!(
            "{:<8} {:<24} {:<10} {:<18} {:>6}",
            column.id,
            column.name(),
            column.simplified_type().label(),
            column.css_class.as_deref().unwrap_or("-"),
            column.width.unwrap_or(column.min_width),
        );
    }
    let selected = engine.selection().selected_ids();
    if !selected.is_empty() {
        println!("\nSelected: {}", selected.join(", "));
        for (value, count) in engine.selection().occurrences() {
            println!("  {:>5} x {}", count, value);
        }
    }
}

fn print_rows(engine: &GridEngine<HeadlessGrid, TextHeaders>, limit: usize) {
    let row_count = engine.rows().row_count();
    let cell_count = engine.viewport().columns().len();
    println!("\n{} rows", row_count);
    for row in 0..row_count.min(limit) {
        let cells: Vec<String> = (0..cell_count)
            .filter_map(|cell| engine.format_cell(row, cell))
            .collect();
        println!("{}", cells.join(" | "));
    }
}

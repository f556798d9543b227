//! Header widget pooling across grid re-renders and data-page swaps.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use common::{two_column_page, wide_page, FakeHeaderFactory, Harness};
use gridsync::headers::{HeaderOutcome, HeaderPool, HeaderRequest, HeaderState};
use gridsync::viewport::WidgetEvent;
use gridsync::{ColumnMetadata, GridError, INDEX_ID};

fn request<'a>(meta: &'a ColumnMetadata) -> HeaderRequest<'a> {
    HeaderRequest {
        column_id: &meta.id,
        metadata: Some(meta),
        is_preview: false,
    }
}

// ============================================================================
// POOL
// ============================================================================

/// At most one live widget per id, whatever the notification order.
#[test]
fn test_no_duplicate_widgets_under_any_sequence() {
    let (factory, log) = FakeHeaderFactory::new();
    let mut pool = HeaderPool::new(factory);
    let meta: Vec<ColumnMetadata> = (0..3)
        .map(|i| ColumnMetadata::new(format!("000{i}"), format!("c{i}"), "string"))
        .collect();

    // Renders without destroys, destroys of unknown ids, re-renders.
    let script: &[(bool, usize)] = &[
        (true, 0),
        (true, 1),
        (true, 0),
        (false, 2),
        (false, 0),
        (true, 0),
        (true, 2),
        (false, 1),
        (false, 1),
        (true, 1),
        (true, 1),
        (false, 0),
        (false, 2),
        (true, 2),
    ];
    for &(render, i) in script {
        if render {
            pool.on_header_render_requested(request(&meta[i]), &true)
                .expect("render");
        } else {
            pool.on_header_destroy_requested(&meta[i].id);
        }
        let live = pool.attached_count() + pool.pooled_count();
        let distinct = meta.iter().filter(|m| pool.is_live(&m.id)).count();
        assert_eq!(live, distinct);
    }

    // One widget per id was ever built; nothing was thrown away.
    assert_eq!(log.borrow().created.len(), 3);
    assert!(log.borrow().disposed.is_empty());
    assert_eq!(pool.state_of("0000"), Some(HeaderState::Pooled));
    assert_eq!(pool.state_of("0001"), Some(HeaderState::Attached));
    assert_eq!(pool.state_of("0002"), Some(HeaderState::Attached));
}

#[test]
fn test_header_without_metadata_uses_index_path() {
    let (factory, log) = FakeHeaderFactory::new();
    let mut pool = HeaderPool::new(factory);
    let outcome = pool
        .on_header_render_requested(
            HeaderRequest {
                column_id: "orphan",
                metadata: None,
                is_preview: false,
            },
            &true,
        )
        .expect("render");
    assert_eq!(outcome, HeaderOutcome::Created);
    assert_eq!(log.borrow().created, vec![INDEX_ID.to_string()]);
}

#[test]
fn test_teardown_disposes_attached_and_pooled() {
    let (factory, log) = FakeHeaderFactory::new();
    let mut pool = HeaderPool::new(factory);
    let a = ColumnMetadata::new("0000", "a", "string");
    let b = ColumnMetadata::new("0001", "b", "string");
    pool.on_header_render_requested(request(&a), &true).expect("render");
    pool.on_header_render_requested(request(&b), &true).expect("render");
    pool.on_header_destroy_requested("0000");

    pool.teardown();

    assert_eq!(log.borrow().disposed.len(), 2);
    assert_eq!(pool.attached_count() + pool.pooled_count(), 0);
}

// ============================================================================
// THROUGH THE ENGINE
// ============================================================================

#[test]
fn test_first_load_creates_one_header_per_column() {
    let h = Harness::loaded(two_column_page());
    assert_eq!(
        h.headers.borrow().created,
        vec![INDEX_ID.to_string(), "0000".to_string(), "0001".to_string()]
    );
    assert_eq!(h.engine.headers().attached_count(), 3);
}

#[test]
fn test_grid_rerender_reuses_headers() {
    let mut h = Harness::loaded(two_column_page());

    // The grid rebuilds one header cell, e.g. after a resize.
    h.widget
        .borrow_mut()
        .queue
        .push_back(WidgetEvent::HeaderDestroyRequested {
            column_id: "0001".to_string(),
        });
    h.send(WidgetEvent::HeaderRendered {
        column_id: "0001".to_string(),
        target: true,
    })
    .expect("render");

    assert_eq!(h.headers.borrow().created.len(), 3);
    assert!(h.headers.borrow().disposed.is_empty());
    assert_eq!(h.engine.headers().state_of("0001"), Some(HeaderState::Attached));
}

#[test]
fn test_new_page_disposes_every_old_header() {
    let mut h = Harness::loaded(two_column_page());
    h.load(two_column_page());

    let log = h.headers.borrow();
    assert_eq!(log.disposed.len(), 3);
    assert_eq!(log.created.len(), 6);
    assert!(!h.engine.headers().renew_all());
    assert_eq!(h.engine.headers().attached_count(), 3);
    assert_eq!(h.engine.headers().pooled_count(), 0);
}

#[test]
fn test_pooled_headers_flushed_by_new_page() {
    let mut h = Harness::loaded(wide_page(2));
    h.send(WidgetEvent::HeaderDestroyRequested {
        column_id: "0003".to_string(),
    })
    .expect("destroy");
    assert_eq!(h.engine.headers().pooled_count(), 1);

    h.engine.load_page(two_column_page(), None).expect("load");

    // Flushed as soon as the page is replaced, before the rebuild runs.
    assert_eq!(h.engine.headers().pooled_count(), 0);
    assert!(h.headers.borrow().disposed.contains(&"0003".to_string()));
}

#[test]
fn test_preview_page_has_no_live_headers() {
    let mut page = wide_page(2);
    page.preview = true;
    let h = Harness::loaded(page);

    assert!(h.headers.borrow().created.is_empty());
    assert_eq!(h.engine.headers().attached_count(), 0);
    assert!(h.engine.viewport().columns().iter().all(|c| c.is_preview));
}

#[test]
fn test_missing_render_target_is_reported() {
    let mut h = Harness::new();
    h.widget.borrow_mut().missing_targets.insert("0001".to_string());
    h.engine.load_page(two_column_page(), None).expect("load");

    let result = h.engine.tick();

    assert!(matches!(
        result,
        Err(GridError::RenderTargetMissing { ref column_id }) if column_id == "0001"
    ));
    // The other headers still made it in.
    assert_eq!(h.engine.headers().attached_count(), 2);
    assert!(!h.engine.headers().is_live("0001"));
}

//! End-to-end rendering against a recording canvas and scripted fetchers

use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use pixmoji::prelude::*;
use pixmoji::{AsyncFetch, Fetch, FetchError, FetchResponse, ShapingOptions};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Size 20, every character 10px wide
struct MonoFont;

impl FontMetrics for MonoFont {
    fn size(&self) -> f32 {
        20.0
    }

    fn advance_width(&self, text: &str, _: &ShapingOptions) -> f32 {
        text.chars().count() as f32 * 10.0
    }

    fn line_height(&self) -> f32 {
        20.0
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Text { text: String, origin: (f32, f32) },
    Paste { origin: (i32, i32), size: (u32, u32) },
}

struct RecordingCanvas {
    width: u32,
    height: u32,
    calls: Vec<Call>,
    cleared: usize,
}

impl RecordingCanvas {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            calls: Vec::new(),
            cleared: 0,
        }
    }
}

impl Canvas for RecordingCanvas {
    type Font = MonoFont;

    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn paint_text(
        &mut self,
        origin: (f32, f32),
        text: &str,
        _: &MonoFont,
        _: &TextOptions,
    ) -> pixmoji::Result<()> {
        self.calls.push(Call::Text {
            text: text.to_string(),
            origin,
        });
        Ok(())
    }

    fn paste_bitmap(&mut self, origin: (i32, i32), bitmap: &RgbaImage) -> pixmoji::Result<()> {
        self.calls.push(Call::Paste {
            origin,
            size: bitmap.dimensions(),
        });
        Ok(())
    }

    fn clear_cache(&mut self) {
        self.cleared += 1;
    }
}

fn png() -> Vec<u8> {
    let bitmap = RgbaImage::from_pixel(72, 72, Rgba([250, 200, 0, 255]));
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(bitmap)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

/// Serves a 72x72 PNG (or a fixed status) and counts requests
#[derive(Clone)]
struct CdnStub {
    status: u16,
    body: Vec<u8>,
    delay: Duration,
    hits: Arc<AtomicUsize>,
}

impl CdnStub {
    fn ok() -> Self {
        Self {
            status: 200,
            body: png(),
            delay: Duration::ZERO,
            hits: Arc::default(),
        }
    }

    fn status(status: u16) -> Self {
        Self {
            status,
            body: Vec::new(),
            ..Self::ok()
        }
    }

    fn slow(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

impl Fetch for CdnStub {
    fn name(&self) -> &'static str {
        "cdn-stub"
    }

    fn fetch(&self, _url: &str) -> std::result::Result<FetchResponse, FetchError> {
        self.hits.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(self.delay);
        Ok(FetchResponse::new(self.status, self.body.clone()))
    }
}

impl AsyncFetch for CdnStub {
    fn name(&self) -> &'static str {
        "cdn-stub-async"
    }

    async fn fetch(&self, _url: &str) -> std::result::Result<FetchResponse, FetchError> {
        self.hits.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        Ok(FetchResponse::new(self.status, self.body.clone()))
    }
}

fn renderer(stub: CdnStub) -> Renderer<RecordingCanvas, CdnStub> {
    Renderer::builder()
        .canvas(RecordingCanvas::new(200, 100))
        .fetcher(stub)
        .build()
        .unwrap()
}

#[test]
fn draws_one_text_call_per_line_then_bitmaps() {
    init_logging();
    let stub = CdnStub::ok();
    let mut r = renderer(stub.clone());

    r.draw_text((5.0, 7.0), "a😀b", &MonoFont, &TextOptions::default())
        .unwrap();

    assert_eq!(
        r.canvas().calls,
        vec![
            Call::Text {
                text: "a  b".into(),
                origin: (5.0, 7.0)
            },
            Call::Paste {
                origin: (15, 7),
                size: (20, 20)
            },
        ]
    );
    assert_eq!(stub.hits(), 1);
}

#[test]
fn failed_lookup_prints_emoji_as_text() {
    let mut r = renderer(CdnStub::status(404));

    r.draw_text((0.0, 0.0), "a😀b", &MonoFont, &TextOptions::default())
        .unwrap();

    assert_eq!(
        r.canvas().calls,
        vec![Call::Text {
            text: "a😀b".into(),
            origin: (0.0, 0.0)
        }]
    );
}

#[test]
fn repeated_emoji_are_fetched_once() {
    let stub = CdnStub::ok();
    let mut r = renderer(stub.clone());

    r.draw_text((0.0, 0.0), "😀😀\n😀", &MonoFont, &TextOptions::default())
        .unwrap();
    r.draw_text((0.0, 50.0), "😀", &MonoFont, &TextOptions::default())
        .unwrap();

    assert_eq!(stub.hits(), 1);
    assert_eq!(r.source().cache_len(), 1);
}

#[test]
fn disabled_cache_refetches_on_every_call() {
    let stub = CdnStub::ok();
    let mut r = Renderer::builder()
        .canvas(RecordingCanvas::new(200, 100))
        .fetcher(stub.clone())
        .cache(false)
        .build()
        .unwrap();

    r.draw_text((0.0, 0.0), "😀😀", &MonoFont, &TextOptions::default())
        .unwrap();
    r.draw_text((0.0, 0.0), "😀", &MonoFont, &TextOptions::default())
        .unwrap();

    assert_eq!(stub.hits(), 2);
    assert_eq!(r.source().cache_len(), 0);
}

#[test]
fn measure_of_two_emoji_is_twice_the_scaled_size() {
    let r = renderer(CdnStub::ok());
    let (width, height) = r
        .measure("😀😀", &MonoFont, &TextOptions::default())
        .unwrap();

    assert_eq!(width, 2.0 * 20.0);
    assert_eq!(height, 20.0);
}

#[test]
fn measure_agrees_with_drawn_line_widths() {
    let mut r = renderer(CdnStub::ok());
    let text = "hi 😀\n<:wave:123456789012345678> there";
    let options = TextOptions {
        node_spacing: 2.0,
        ..Default::default()
    };

    let (width, _) = r.measure(text, &MonoFont, &options).unwrap();
    let plan = r.plan((0.0, 0.0), text, &MonoFont, &options).unwrap();
    let widest = plan.lines.iter().map(|l| l.width).fold(0.0, f32::max);
    assert_eq!(width, widest);

    r.draw_text((0.0, 0.0), text, &MonoFont, &options).unwrap();
}

#[test]
fn centered_second_line_sits_under_first_line_midpoint() {
    let mut r = renderer(CdnStub::ok());
    let options = TextOptions {
        anchor: Some("ma".parse().unwrap()),
        align: Align::Center,
        ..Default::default()
    };

    r.draw_text((100.0, 0.0), "wide line\nnarrow", &MonoFont, &options)
        .unwrap();

    let origins: Vec<f32> = r
        .canvas()
        .calls
        .iter()
        .filter_map(|c| match c {
            Call::Text { origin, .. } => Some(origin.0),
            Call::Paste { .. } => None,
        })
        .collect();
    assert_eq!(origins, vec![100.0, 100.0]);
}

#[test]
fn multiline_middle_anchor_is_rejected_before_fetching() {
    let stub = CdnStub::ok();
    let mut r = renderer(stub.clone());

    for code in ["lm", "ld"] {
        let options = TextOptions {
            anchor: Some(code.parse().unwrap()),
            ..Default::default()
        };
        let outcome = r.draw_text((0.0, 0.0), "😀\n😀", &MonoFont, &options);
        assert!(matches!(
            outcome,
            Err(PixmojiError::UnsupportedMultilineAnchor(_))
        ));
    }
    assert_eq!(stub.hits(), 0);
    assert!(r.canvas().calls.is_empty());

    let single = TextOptions {
        anchor: Some("mm".parse().unwrap()),
        ..Default::default()
    };
    r.draw_text((50.0, 50.0), "😀", &MonoFont, &single).unwrap();
}

#[test]
fn lifecycle_is_enforced() {
    let stub = CdnStub::ok();
    let mut r = renderer(stub);

    assert!(matches!(r.open(), Err(PixmojiError::AlreadyOpen)));

    r.close().unwrap();
    assert!(r.is_closed());
    assert_eq!(r.canvas().cleared, 1);
    assert!(matches!(r.close(), Err(PixmojiError::AlreadyClosed)));
    assert!(matches!(
        r.draw_text((0.0, 0.0), "x", &MonoFont, &TextOptions::default()),
        Err(PixmojiError::Closed)
    ));
    assert!(matches!(
        r.measure("x", &MonoFont, &TextOptions::default()),
        Err(PixmojiError::Closed)
    ));

    r.open().unwrap();
    r.draw_text((0.0, 0.0), "x😀", &MonoFont, &TextOptions::default())
        .unwrap();
    assert_eq!(r.canvas().calls.len(), 2);
}

#[test]
fn close_clears_the_emoji_cache() {
    let stub = CdnStub::ok();
    let mut r = renderer(stub.clone());

    r.draw_text((0.0, 0.0), "😀", &MonoFont, &TextOptions::default())
        .unwrap();
    r.close().unwrap();
    r.open().unwrap();
    r.draw_text((0.0, 0.0), "😀", &MonoFont, &TextOptions::default())
        .unwrap();

    assert_eq!(stub.hits(), 2);
}

#[test]
fn zero_sized_canvas_is_rejected() {
    let outcome = Renderer::builder()
        .canvas(RecordingCanvas::new(0, 10))
        .fetcher(CdnStub::ok())
        .build();
    assert!(matches!(
        outcome,
        Err(PixmojiError::InvalidCanvas {
            width: 0,
            height: 10
        })
    ));
}

#[test]
fn builder_requires_canvas_and_fetcher() {
    let missing_canvas = Renderer::<RecordingCanvas, CdnStub>::builder()
        .fetcher(CdnStub::ok())
        .build();
    assert!(matches!(missing_canvas, Err(PixmojiError::Config(_))));

    let missing_fetcher = Renderer::<RecordingCanvas, CdnStub>::builder()
        .canvas(RecordingCanvas::new(10, 10))
        .build();
    assert!(matches!(missing_fetcher, Err(PixmojiError::Config(_))));
}

#[test]
fn custom_emoji_can_be_left_as_text() {
    let stub = CdnStub::ok();
    let mut r = Renderer::builder()
        .canvas(RecordingCanvas::new(200, 100))
        .fetcher(stub.clone())
        .render_custom_emoji(false)
        .build()
        .unwrap();

    r.draw_text(
        (0.0, 0.0),
        "<:wave:123456789012345678>",
        &MonoFont,
        &TextOptions::default(),
    )
    .unwrap();

    assert_eq!(stub.hits(), 0);
    assert_eq!(
        r.canvas().calls,
        vec![Call::Text {
            text: "123456789012345678".into(),
            origin: (0.0, 0.0)
        }]
    );
}

#[test]
fn per_call_overrides_beat_renderer_defaults() {
    let mut r = Renderer::builder()
        .canvas(RecordingCanvas::new(200, 100))
        .fetcher(CdnStub::ok())
        .emoji_scale_factor(2.0)
        .emoji_position_offset((1, 1))
        .build()
        .unwrap();

    r.draw_text((0.0, 0.0), "😀", &MonoFont, &TextOptions::default())
        .unwrap();
    let options = TextOptions {
        emoji_scale_factor: Some(0.5),
        emoji_position_offset: Some((0, 5)),
        ..Default::default()
    };
    r.draw_text((0.0, 0.0), "😀", &MonoFont, &options).unwrap();

    let pastes: Vec<_> = r
        .canvas()
        .calls
        .iter()
        .filter(|c| matches!(c, Call::Paste { .. }))
        .cloned()
        .collect();
    assert_eq!(
        pastes,
        vec![
            Call::Paste {
                origin: (1, 1),
                size: (40, 40)
            },
            Call::Paste {
                origin: (0, 5),
                size: (10, 10)
            },
        ]
    );
}

#[test]
fn invalid_scale_override_is_a_config_error() {
    let mut r = renderer(CdnStub::ok());
    let options = TextOptions {
        emoji_scale_factor: Some(-1.0),
        ..Default::default()
    };
    assert!(matches!(
        r.draw_text((0.0, 0.0), "😀", &MonoFont, &options),
        Err(PixmojiError::Config(_))
    ));
}

#[test]
fn measure_rejects_the_scale_draw_text_rejects() {
    let stub = CdnStub::ok();
    let r = renderer(stub.clone());
    let options = TextOptions {
        emoji_scale_factor: Some(-1.0),
        ..Default::default()
    };
    assert!(matches!(
        r.measure("😀", &MonoFont, &options),
        Err(PixmojiError::Config(_))
    ));
    assert_eq!(stub.hits(), 0);
}

#[tokio::test]
async fn async_renderer_fetches_each_emoji_once() {
    init_logging();
    let stub = CdnStub::ok().slow(Duration::from_millis(20));
    let mut r = Renderer::builder()
        .canvas(RecordingCanvas::new(300, 100))
        .fetcher(stub.clone())
        .build_async()
        .await
        .unwrap();

    r.draw_text((0.0, 0.0), "😀👋😀\n👋🎉", &MonoFont, &TextOptions::default())
        .await
        .unwrap();

    assert_eq!(stub.hits(), 3);
    let pastes = r
        .canvas()
        .calls
        .iter()
        .filter(|c| matches!(c, Call::Paste { .. }))
        .count();
    assert_eq!(pastes, 5);
}

#[tokio::test]
async fn abandoned_async_render_leaves_canvas_untouched() {
    let stub = CdnStub::ok().slow(Duration::from_millis(500));
    let mut r = Renderer::builder()
        .canvas(RecordingCanvas::new(300, 100))
        .fetcher(stub)
        .build_async()
        .await
        .unwrap();

    let outcome = tokio::time::timeout(
        Duration::from_millis(20),
        r.draw_text((0.0, 0.0), "text 😀", &MonoFont, &TextOptions::default()),
    )
    .await;

    assert!(outcome.is_err());
    assert!(r.canvas().calls.is_empty());
}

#[tokio::test]
async fn async_plan_matches_blocking_plan() {
    let options = TextOptions {
        anchor: Some("ma".parse().unwrap()),
        ..Default::default()
    };
    let blocking = renderer(CdnStub::ok())
        .plan((100.0, 10.0), "hi 😀\nthere", &MonoFont, &options)
        .unwrap();

    let r = Renderer::builder()
        .canvas(RecordingCanvas::new(300, 100))
        .fetcher(CdnStub::ok())
        .build_async()
        .await
        .unwrap();
    let plan = r
        .plan((100.0, 10.0), "hi 😀\nthere", &MonoFont, &options)
        .await
        .unwrap();

    assert_eq!(plan.lines, blocking.lines);
    assert_eq!(plan.ops.len(), blocking.ops.len());
    assert!(r.canvas().calls.is_empty());

    let scale = TextOptions {
        emoji_scale_factor: Some(0.0),
        ..Default::default()
    };
    assert!(matches!(
        r.measure("😀", &MonoFont, &scale).await,
        Err(PixmojiError::Config(_))
    ));
}

#[tokio::test]
async fn async_lifecycle_matches_blocking() {
    let mut r = Renderer::builder()
        .canvas(RecordingCanvas::new(300, 100))
        .fetcher(CdnStub::ok())
        .build_async()
        .await
        .unwrap();

    let (width, _) = r
        .measure("😀😀", &MonoFont, &TextOptions::default())
        .await
        .unwrap();
    assert_eq!(width, 40.0);

    r.close().await.unwrap();
    assert!(matches!(r.close().await, Err(PixmojiError::AlreadyClosed)));
    assert!(matches!(
        r.draw_text((0.0, 0.0), "x", &MonoFont, &TextOptions::default())
            .await,
        Err(PixmojiError::Closed)
    ));
    r.open().unwrap();
    r.draw_text((0.0, 0.0), "x", &MonoFont, &TextOptions::default())
        .await
        .unwrap();
}

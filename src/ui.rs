//! egui front end. Draws the shared page state and forwards form
//! submissions to the request controller.

use std::sync::Arc;
use std::time::Duration;

use chrono::Datelike;
use eframe::{App, Frame, egui};
use egui::{Color32, ColorImage, RichText, TextureOptions};
use parking_lot::Mutex;
use tokio::runtime::Runtime;
use tracing::{debug, info, warn};

use crate::api::HttpMetadataService;
use crate::config::Args;
use crate::controller::RequestController;
use crate::model::DownloadLinkEntry;
use crate::page::{PageState, SharedPage};
use crate::renderer::{reveal_finished, reveal_opacity};
use crate::thumbnail::fetch_thumbnail;

const BUSY_COLOR: Color32 = Color32::from_rgb(0xff, 0xd1, 0x66);
const ACCENT_COLOR: Color32 = Color32::from_rgb(0x6c, 0x8c, 0xff);
const THUMB_WIDTH: f32 = 160.0;

type Controller = RequestController<HttpMetadataService, SharedPage>;

/// Application state for the GUI
pub struct FetcherApp {
    runtime: Arc<Runtime>,
    args: Args,
    controller: Arc<Controller>,
    page: SharedPage,
    /// Client reused for thumbnail fetches
    http: reqwest::Client,
    /// Input field for the media URL
    url_input: String,
    /// Thumbnail URL the current texture belongs to (or is being fetched for)
    thumbnail_for: Option<String>,
    thumbnail: Option<egui::TextureHandle>,
    /// Decoded thumbnails waiting to be uploaded as textures
    thumbnail_results: Arc<Mutex<Vec<(String, ColorImage)>>>,
    year: i32,
}

impl FetcherApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        runtime: Arc<Runtime>,
        args: Args,
        service: HttpMetadataService,
    ) -> Self {
        let repaint = cc.egui_ctx.clone();
        let page = SharedPage::new().with_notifier(move || repaint.request_repaint());
        let http = service.client().clone();
        let controller = Arc::new(RequestController::new(service, page.clone()));

        Self {
            runtime,
            args,
            controller,
            page,
            http,
            url_input: String::new(),
            thumbnail_for: None,
            thumbnail: None,
            thumbnail_results: Arc::new(Mutex::new(Vec::new())),
            year: chrono::Local::now().year(),
        }
    }

    /// Accepts the submission on the GUI thread, so the form is disabled
    /// before the next frame, then hands the request to the runtime.
    fn submit(&self) {
        let Some(submission) = self.controller.begin(&self.url_input) else {
            return;
        };
        let controller = Arc::clone(&self.controller);
        self.runtime.spawn(async move {
            controller.complete(submission).await;
        });
    }

    fn open_download(&self, ctx: &egui::Context, entry: &DownloadLinkEntry) {
        match self.args.resolve(&entry.href) {
            Ok(url) => {
                info!(%url, "handing download to the browser");
                ctx.open_url(egui::OpenUrl::new_tab(url));
            }
            Err(err) => warn!(href = %entry.href, error = %err, "could not build download link"),
        }
    }

    /// Starts a fetch when the page names a new thumbnail and uploads
    /// finished ones, dropping any that no longer match.
    fn sync_thumbnail(&mut self, ctx: &egui::Context, page: &PageState) {
        let wanted = page.details.thumbnail.clone();
        if wanted != self.thumbnail_for {
            self.thumbnail = None;
            self.thumbnail_for = wanted.clone();
            if let Some(src) = wanted {
                self.spawn_thumbnail_fetch(ctx, src);
            }
        }

        let finished: Vec<_> = self.thumbnail_results.lock().drain(..).collect();
        for (src, img) in finished {
            if self.thumbnail_for.as_deref() == Some(src.as_str()) {
                self.thumbnail = Some(ctx.load_texture("thumbnail", img, TextureOptions::default()));
            } else {
                debug!(%src, "discarding stale thumbnail");
            }
        }
    }

    fn spawn_thumbnail_fetch(&self, ctx: &egui::Context, src: String) {
        let url = match self.args.resolve(&src) {
            Ok(url) => url,
            Err(err) => {
                warn!(%src, error = %err, "unusable thumbnail URL");
                return;
            }
        };
        let http = self.http.clone();
        let results = Arc::clone(&self.thumbnail_results);
        let ctx = ctx.clone();
        self.runtime.spawn(async move {
            match fetch_thumbnail(&http, url.as_str()).await {
                Ok(img) => {
                    results.lock().push((src, img));
                    ctx.request_repaint();
                }
                Err(err) => warn!(%url, error = %err, "thumbnail unavailable"),
            }
        });
    }

    fn show_result(&self, ui: &mut egui::Ui, page: &PageState) -> Option<DownloadLinkEntry> {
        if page.skeleton_visible {
            skeleton(ui);
        }

        if page.content_head_visible {
            ui.horizontal(|ui| {
                if let Some(tex) = &self.thumbnail {
                    ui.add(egui::Image::new(tex).max_width(THUMB_WIDTH));
                }
                ui.vertical(|ui| {
                    ui.heading(&page.details.title);
                    ui.horizontal(|ui| {
                        ui.label(&page.details.uploader);
                        if let Some(duration) = &page.details.duration {
                            ui.weak(duration);
                        }
                    });
                });
            });
        }

        if !page.formats_visible {
            return None;
        }

        ui.add_space(8.0);
        let elapsed = page
            .formats_rendered_at
            .map(|at| at.elapsed())
            .unwrap_or(Duration::MAX);
        let mut clicked = None;
        egui::ScrollArea::vertical()
            .auto_shrink([false; 2])
            .show(ui, |ui| {
                for (idx, entry) in page.formats.iter().enumerate() {
                    let opacity = reveal_opacity(idx, elapsed);
                    // Later entries start even later
                    if opacity <= 0.0 {
                        break;
                    }
                    ui.scope(|ui| {
                        ui.set_opacity(opacity);
                        egui::Frame::group(ui.style()).show(ui, |ui| {
                            ui.horizontal(|ui| {
                                ui.vertical(|ui| {
                                    ui.label(RichText::new(&entry.label).strong());
                                    if !entry.size_label.is_empty() {
                                        ui.label(RichText::new(&entry.size_label).small());
                                    }
                                });
                                if ui.button("Download").clicked() {
                                    clicked = Some(entry.clone());
                                }
                            });
                        });
                    });
                }
            });

        if !reveal_finished(page.formats.len(), elapsed) {
            ui.ctx().request_repaint();
        }
        clicked
    }
}

/// GUI update loop: called each frame to redraw and handle interactions
impl App for FetcherApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        let page = self.page.snapshot();

        // 1️⃣ Thumbnail bookkeeping
        self.sync_thumbnail(ctx, &page);

        // 2️⃣ Top panel: progress bar and state indicator
        egui::TopBottomPanel::top("status").show(ctx, |ui| {
            if page.top_bar_visible {
                ui.add(
                    egui::ProgressBar::new(0.0)
                        .animate(true)
                        .desired_width(ui.available_width()),
                );
            }
            ui.horizontal(|ui| {
                let color = if page.state.is_busy() { BUSY_COLOR } else { ACCENT_COLOR };
                let (rect, _) = ui.allocate_exact_size(egui::vec2(10.0, 10.0), egui::Sense::hover());
                ui.painter().circle_filled(rect.center(), 5.0, color);
                ui.label(page.state.label());
                if page.spinner_visible {
                    ui.add(egui::Spinner::new());
                }
            });
        });

        // 3️⃣ Footer
        egui::TopBottomPanel::bottom("footer").show(ctx, |ui| {
            ui.weak(format!("© {}", self.year));
        });

        // 4️⃣ Main panel: form, hint and results
        let mut download = None;
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Media Link Fetcher");
            ui.label("Paste a video URL:");

            let mut submitted = false;
            ui.horizontal(|ui| {
                let input = ui.add(
                    egui::TextEdit::singleline(&mut self.url_input)
                        .hint_text("https://…")
                        .desired_width(420.0),
                );
                let enter = input.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                let clicked = ui
                    .add_enabled(page.submit_enabled, egui::Button::new("Fetch"))
                    .clicked();
                submitted = clicked || (enter && page.submit_enabled);
            });
            if submitted {
                self.submit();
            }

            if !page.hint.is_empty() {
                ui.colored_label(ui.visuals().error_fg_color, &page.hint);
            }

            if page.result_visible {
                ui.separator();
                download = self.show_result(ui, &page);
            }
        });

        if let Some(entry) = download {
            self.open_download(ctx, &entry);
        }

        if page.state.is_busy() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}

fn skeleton(ui: &mut egui::Ui) {
    let color = ui.visuals().widgets.inactive.bg_fill;
    ui.horizontal(|ui| {
        placeholder(ui, egui::vec2(THUMB_WIDTH, 90.0), color);
        ui.vertical(|ui| {
            placeholder(ui, egui::vec2(260.0, 20.0), color);
            placeholder(ui, egui::vec2(160.0, 14.0), color);
        });
    });
}

fn placeholder(ui: &mut egui::Ui, size: egui::Vec2, color: Color32) {
    let (rect, _) = ui.allocate_exact_size(size, egui::Sense::hover());
    ui.painter().rect_filled(rect, 4.0, color);
}

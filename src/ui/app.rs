use eframe::egui;
use egui::{Color32, RichText};
use std::future::Future;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;

use crate::api::{
    ApiError, Block, BlockKind, Comment, Direction, MemoryStore, NewSchedule, PlanRow, Post,
    PostUpsert, RowId, ScheduleRow, SupabaseClient, TripStore,
};
use crate::config::Config;
use crate::plan::selector::StagedText;
use crate::plan::{PlanEdit, Plans, ACTIVITIES, FOODS, VIBES};
use crate::schedule::{
    self, BlockStore, DragOutcome, TimelineEditor, DAY_LABEL, DEFAULT_ACTIVITY_DURATION,
};
use crate::social::{self, Board, PostCard, Reactions};
use super::theme;
use super::views::{self, CardAction};

const SAVE_ERROR: &str = "Could not save right now. Try again in a bit?";

pub struct TripboardApp {
    config: Config,
    store: Arc<dyn TripStore>,
    view: View,

    // Planner
    plans: Plans,
    plans_loading: bool,
    direction: Direction,
    staged_activity: StagedText,
    staged_food: StagedText,

    // Open day schedule (editable or a read-only preview from the board)
    schedule: Option<ScheduleView>,
    open_seq: u64,

    // Board
    board: Board,
    pending_delete: Option<Post>,

    // Settings dialog
    show_settings: bool,
    settings_url: String,
    settings_key: String,
    settings_workspace: String,
    settings_partners: [String; 2],
    settings_home: String,
    settings_away: String,
    settings_font_scale: f32,

    // Status
    status_message: Option<String>,
    is_offline: bool,

    // Async communication
    ctx: egui::Context,
    runtime: tokio::runtime::Runtime,
    result_rx: Receiver<AsyncResult>,
    result_tx: Sender<AsyncResult>,
}

/// The app opens on the board
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum View {
    Planner,
    Schedule,
    #[default]
    Board,
}

struct ScheduleView {
    /// Matches results of the create and load calls to this view
    seq: u64,
    /// None until the schedule row has been created
    schedule_id: Option<RowId>,
    direction: Direction,
    blocks: BlockStore,
    editor: TimelineEditor,
    loading: bool,
    activity_duration: i32,
    /// Set for a read-only preview opened from the board
    post: Option<Post>,
    reactions: Reactions,
    saving: bool,
    save_error: Option<String>,
}

/// Results addressed to the open day schedule
enum ScheduleResult {
    Created(u64, ScheduleRow),
    BlocksLoaded(RowId, Vec<Block>),
    BlockAdded(Block),
    ReactionsLoaded(RowId, Reactions),
    Saved(RowId),
    SaveFailed(RowId),
    LoadFailed(u64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Applied {
    Accepted,
    /// The view it was meant for is gone
    Stale,
    OpenBoard,
}

impl ScheduleView {
    fn fresh(seq: u64, direction: Direction) -> Self {
        Self {
            seq,
            schedule_id: None,
            direction,
            blocks: BlockStore::new(),
            editor: TimelineEditor::new(false),
            loading: true,
            activity_duration: DEFAULT_ACTIVITY_DURATION,
            post: None,
            reactions: Reactions::default(),
            saving: false,
            save_error: None,
        }
    }

    fn preview(seq: u64, post: Post) -> Self {
        Self {
            schedule_id: Some(post.schedule_id.clone()),
            direction: post.direction,
            editor: TimelineEditor::new(true),
            post: Some(post),
            reactions: Reactions::pending(),
            ..Self::fresh(seq, Direction::NyuToIu)
        }
    }

    fn is_current(&self, schedule_id: &RowId) -> bool {
        self.schedule_id.as_ref() == Some(schedule_id)
    }

    fn previewing(&self, post_id: &RowId) -> bool {
        self.post.as_ref().is_some_and(|p| &p.id == post_id)
    }

    fn apply(&mut self, result: ScheduleResult) -> Applied {
        match result {
            ScheduleResult::Created(seq, row) if seq == self.seq => {
                tracing::info!(schedule = %row.id, "schedule created");
                self.schedule_id = Some(row.id);
                self.loading = false;
            }
            ScheduleResult::BlocksLoaded(schedule_id, rows) if self.is_current(&schedule_id) => {
                self.blocks.replace_all(rows);
                self.loading = false;
            }
            ScheduleResult::BlockAdded(block) if self.is_current(&block.schedule_id) => {
                self.blocks.insert(block);
            }
            ScheduleResult::ReactionsLoaded(post_id, reactions) if self.previewing(&post_id) => {
                self.reactions = reactions;
            }
            ScheduleResult::Saved(schedule_id) if self.is_current(&schedule_id) => {
                self.saving = false;
                return Applied::OpenBoard;
            }
            ScheduleResult::SaveFailed(schedule_id) if self.is_current(&schedule_id) => {
                self.saving = false;
                self.save_error = Some(SAVE_ERROR.to_string());
            }
            ScheduleResult::LoadFailed(seq) if seq == self.seq => self.loading = false,
            _ => return Applied::Stale,
        }
        Applied::Accepted
    }
}

/// Whose loading flag a failed request clears
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadTarget {
    /// Fire-and-forget write; no flag to clear
    Write,
    Plans,
    Board,
    Schedule(u64),
}

enum AsyncResult {
    PlansLoaded(Vec<PlanRow>),
    BoardLoaded(Vec<PostCard>),
    CommentAdded(Comment),
    Schedule(ScheduleResult),
    Failed { target: LoadTarget, offline: bool },
}

/// Log a swallowed remote failure. Loads get their flag cleared; writes only
/// report back when the connection is down.
fn failed(e: &ApiError, action: &str, target: LoadTarget) -> Option<AsyncResult> {
    tracing::error!(error = %e, "Error {}", action);
    let offline = e.is_offline();
    if target == LoadTarget::Write && !offline {
        return None;
    }
    Some(AsyncResult::Failed { target, offline })
}

fn make_store(config: &Config) -> Arc<dyn TripStore> {
    if !config.is_configured() {
        tracing::info!("no backend configured, using in-memory store");
        return Arc::new(MemoryStore::new());
    }
    match SupabaseClient::new(config) {
        Ok(client) => {
            tracing::info!(url = %config.rest_url(), "using remote store");
            Arc::new(client)
        }
        Err(e) => {
            tracing::warn!(error = %e, "falling back to in-memory store");
            Arc::new(MemoryStore::new())
        }
    }
}

impl TripboardApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let config = Config::load().unwrap_or_else(|e| {
            tracing::error!(error = ?e, "Error loading config, using defaults");
            Config::default()
        });
        super::setup_fonts(&cc.egui_ctx);
        super::setup_theme(&cc.egui_ctx);

        let runtime = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
        let (result_tx, result_rx) = channel();

        let mut app = Self {
            store: make_store(&config),
            view: View::default(),
            plans: Plans::default(),
            plans_loading: false,
            direction: Direction::NyuToIu,
            staged_activity: StagedText::default(),
            staged_food: StagedText::default(),
            schedule: None,
            open_seq: 0,
            board: Board::default(),
            pending_delete: None,
            show_settings: false,
            settings_url: config.supabase_url.clone(),
            settings_key: String::new(),
            settings_workspace: config.workspace_key.clone(),
            settings_partners: config.partners.clone(),
            settings_home: config.home_place.clone(),
            settings_away: config.away_place.clone(),
            settings_font_scale: config.font_scale,
            config,
            status_message: None,
            is_offline: false,
            ctx: cc.egui_ctx.clone(),
            runtime,
            result_rx,
            result_tx,
        };

        app.load_plans();
        app.open_board();
        app
    }

    /// Run a store call on the runtime; its result (if any) comes back
    /// through `check_async_results` on a later frame.
    fn spawn<F, Fut>(&self, task: F)
    where
        F: FnOnce(Arc<dyn TripStore>) -> Fut,
        Fut: Future<Output = Option<AsyncResult>> + Send + 'static,
    {
        let tx = self.result_tx.clone();
        let ctx = self.ctx.clone();
        let fut = task(Arc::clone(&self.store));
        self.runtime.spawn(async move {
            if let Some(result) = fut.await {
                let _ = tx.send(result);
                ctx.request_repaint();
            }
        });
    }

    fn check_async_results(&mut self) {
        while let Ok(result) = self.result_rx.try_recv() {
            match result {
                AsyncResult::PlansLoaded(rows) => {
                    self.plans.apply_rows(rows);
                    self.plans_loading = false;
                    self.is_offline = false;
                }
                AsyncResult::BoardLoaded(cards) => {
                    self.board.cards = cards;
                    self.board.loading = false;
                    self.is_offline = false;
                }
                AsyncResult::CommentAdded(comment) => {
                    if let Some(view) = self.schedule.as_mut() {
                        if view.previewing(&comment.post_id) {
                            view.reactions.push_comment(comment.clone());
                        }
                    }
                    self.board.push_comment(comment);
                }
                AsyncResult::Schedule(result) => {
                    let applied = match self.schedule.as_mut() {
                        Some(view) => view.apply(result),
                        None => Applied::Stale,
                    };
                    match applied {
                        Applied::Accepted => {}
                        Applied::Stale => tracing::debug!("dropping result for closed schedule"),
                        Applied::OpenBoard => self.open_board(),
                    }
                }
                AsyncResult::Failed { target, offline } => {
                    if offline {
                        self.is_offline = true;
                    }
                    match target {
                        LoadTarget::Write => {}
                        LoadTarget::Plans => self.plans_loading = false,
                        LoadTarget::Board => self.board.loading = false,
                        LoadTarget::Schedule(seq) => {
                            if let Some(view) = self.schedule.as_mut() {
                                view.apply(ScheduleResult::LoadFailed(seq));
                            }
                        }
                    }
                }
            }
        }
    }

    // ========================================================================
    // Planner
    // ========================================================================

    fn load_plans(&mut self) {
        self.plans_loading = true;
        let workspace = self.config.workspace();
        self.spawn(move |store| async move {
            match store.load_plans(&workspace).await {
                Ok(rows) => Some(AsyncResult::PlansLoaded(rows)),
                Err(e) => failed(&e, "loading plans", LoadTarget::Plans),
            }
        });
    }

    fn apply_plan_edit(&mut self, direction: Direction, edit: PlanEdit) {
        let workspace = self.config.workspace();
        let Some(row) = self.plans.apply(&workspace, direction, edit) else {
            return;
        };
        self.spawn(move |store| async move {
            match store.upsert_plan(&row).await {
                Ok(()) => None,
                Err(e) => failed(&e, "saving plan", LoadTarget::Write),
            }
        });
    }

    fn start_new_plan(&mut self) {
        tracing::info!("starting a new plan");
        self.plans.reset();
        self.direction = Direction::NyuToIu;
        self.staged_activity = StagedText::default();
        self.staged_food = StagedText::default();
    }

    // ========================================================================
    // Schedule
    // ========================================================================

    fn open_new_schedule(&mut self, direction: Direction) {
        self.open_seq += 1;
        let seq = self.open_seq;
        self.schedule = Some(ScheduleView::fresh(seq, direction));
        self.view = View::Schedule;
        tracing::info!(direction = direction.as_wire(), "opening new schedule");

        let row = NewSchedule {
            profile_key: self.config.workspace(),
            direction,
            day_label: DAY_LABEL.to_string(),
        };
        self.spawn(move |store| async move {
            match store.create_schedule(&row).await {
                Ok(created) => Some(AsyncResult::Schedule(ScheduleResult::Created(seq, created))),
                Err(e) => failed(&e, "creating schedule", LoadTarget::Schedule(seq)),
            }
        });
    }

    fn open_preview(&mut self, post: Post) {
        self.open_seq += 1;
        let seq = self.open_seq;
        let schedule_id = post.schedule_id.clone();
        let post_id = post.id.clone();
        tracing::info!(post = %post_id, "opening schedule preview");
        self.schedule = Some(ScheduleView::preview(seq, post));
        self.view = View::Schedule;

        self.spawn(move |store| async move {
            match store.list_blocks(&schedule_id).await {
                Ok(rows) => Some(AsyncResult::Schedule(ScheduleResult::BlocksLoaded(
                    schedule_id,
                    rows,
                ))),
                Err(e) => failed(&e, "loading blocks", LoadTarget::Schedule(seq)),
            }
        });
        let workspace = self.config.workspace();
        self.spawn(move |store| async move {
            let reactions = social::load_reactions(&*store, &workspace, &post_id).await;
            Some(AsyncResult::Schedule(ScheduleResult::ReactionsLoaded(
                post_id, reactions,
            )))
        });
    }

    fn add_block(&mut self, kind: BlockKind, label: String, minutes: i32) {
        let Some(view) = self.schedule.as_ref() else {
            return;
        };
        let Some(schedule_id) = view.schedule_id.as_ref() else {
            return;
        };
        let row = schedule::new_block(schedule_id, kind, &label, minutes, &view.blocks);
        self.spawn(move |store| async move {
            match store.insert_block(&row).await {
                Ok(block) => Some(AsyncResult::Schedule(ScheduleResult::BlockAdded(block))),
                Err(e) => failed(&e, "adding block", LoadTarget::Write),
            }
        });
    }

    fn apply_drag_outcome(&mut self, outcome: DragOutcome) {
        match outcome {
            DragOutcome::Delete(block_id) => {
                tracing::debug!(block = %block_id, "block dropped in trash");
                self.spawn(move |store| async move {
                    match store.delete_block(&block_id).await {
                        Ok(()) => None,
                        Err(e) => failed(&e, "deleting block", LoadTarget::Write),
                    }
                });
            }
            DragOutcome::Reschedule(block_id, times) => {
                self.spawn(move |store| async move {
                    match store.update_block_times(&block_id, &times).await {
                        Ok(()) => None,
                        Err(e) => failed(&e, "updating block", LoadTarget::Write),
                    }
                });
            }
        }
    }

    fn save_to_board(&mut self) {
        let Some(view) = self.schedule.as_mut() else {
            return;
        };
        let Some(schedule_id) = view.schedule_id.clone() else {
            return;
        };
        view.saving = true;
        view.save_error = None;

        let user = self.config.current_user_name().to_string();
        let destination = view
            .direction
            .destination(&self.config.home_place, &self.config.away_place)
            .to_string();
        let vibe = self.plans.get(view.direction).vibe.clone();
        let row = PostUpsert {
            profile_key: self.config.workspace(),
            schedule_id: schedule_id.clone(),
            direction: view.direction,
            day_label: DAY_LABEL.to_string(),
            title: social::post_title(&user, &vibe, &destination),
            author_name: Some(user),
        };
        self.spawn(move |store| async move {
            match store.upsert_post(&row).await {
                Ok(()) => Some(AsyncResult::Schedule(ScheduleResult::Saved(schedule_id))),
                Err(e) => {
                    tracing::error!(error = %e, "Error saving schedule");
                    Some(AsyncResult::Schedule(ScheduleResult::SaveFailed(schedule_id)))
                }
            }
        });
    }

    // ========================================================================
    // Board
    // ========================================================================

    fn open_board(&mut self) {
        tracing::info!("opening board");
        self.view = View::Board;
        self.board.loading = true;
        let workspace = self.config.workspace();
        self.spawn(move |store| async move {
            match social::load_board(&*store, &workspace).await {
                Ok(cards) => Some(AsyncResult::BoardLoaded(cards)),
                Err(e) => failed(&e, "loading board", LoadTarget::Board),
            }
        });
    }

    fn send_like(&self, post_id: RowId, liked: bool) {
        let workspace = self.config.workspace();
        self.spawn(move |store| async move {
            match social::send_like(&*store, &workspace, &post_id, liked).await {
                Ok(()) => None,
                Err(e) => failed(&e, "updating like", LoadTarget::Write),
            }
        });
    }

    fn send_comment(&self, post_id: RowId, draft: &str) {
        let Some(text) = social::comment_text(draft) else {
            return;
        };
        let workspace = self.config.workspace();
        let author = self.config.current_user_name().to_string();
        self.spawn(move |store| async move {
            match social::send_comment(&*store, &workspace, &post_id, &author, text).await {
                Ok(comment) => Some(AsyncResult::CommentAdded(comment)),
                Err(e) => failed(&e, "adding comment", LoadTarget::Write),
            }
        });
    }

    fn delete_post(&mut self, post: Post) {
        tracing::info!(post = %post.id, "deleting schedule");
        self.board.remove(&post.id);
        self.spawn(move |store| async move {
            let failed = social::delete_cascade(&*store, &post).await;
            if !failed.is_empty() {
                tracing::warn!(
                    post = %post.id,
                    steps = failed.len(),
                    "schedule only partly deleted"
                );
            }
            None
        });
    }

    // ========================================================================
    // Settings
    // ========================================================================

    fn open_settings(&mut self) {
        self.settings_url = self.config.supabase_url.clone();
        self.settings_key.clear();
        self.settings_workspace = self.config.workspace_key.clone();
        self.settings_partners = self.config.partners.clone();
        self.settings_home = self.config.home_place.clone();
        self.settings_away = self.config.away_place.clone();
        self.settings_font_scale = self.config.font_scale;
        self.show_settings = true;
    }

    fn save_settings(&mut self) {
        self.config.supabase_url = self.settings_url.trim().to_string();
        let key = self.settings_key.trim();
        if !key.is_empty() {
            self.config.anon_key = Some(key.to_string());
        }
        if !self.settings_workspace.trim().is_empty() {
            self.config.workspace_key = self.settings_workspace.trim().to_string();
        }
        for (slot, name) in self.config.partners.iter_mut().zip(&self.settings_partners) {
            if !name.trim().is_empty() {
                *slot = name.trim().to_string();
            }
        }
        if !self.settings_home.trim().is_empty() {
            self.config.home_place = self.settings_home.trim().to_string();
        }
        if !self.settings_away.trim().is_empty() {
            self.config.away_place = self.settings_away.trim().to_string();
        }
        self.config.font_scale = self.settings_font_scale;
        self.persist_config();

        self.store = make_store(&self.config);
        self.show_settings = false;
        self.settings_key.clear();

        self.schedule = None;
        self.plans.reset();
        self.load_plans();
        if self.view == View::Board {
            self.open_board();
        } else {
            self.view = View::Planner;
        }
    }

    fn persist_config(&mut self) {
        match self.config.save() {
            Ok(()) => self.status_message = None,
            Err(e) => {
                tracing::error!(error = ?e, "Error saving config");
                self.status_message = Some(format!("Could not save settings: {}", e));
            }
        }
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    fn render_top_bar(&mut self, ui: &mut egui::Ui) {
        let mut go_to = None;
        let mut switch_user = None;
        let mut settings_clicked = false;

        ui.horizontal(|ui| {
            ui.label(RichText::new("Tripboard").size(20.0).strong());
            ui.add_space(16.0);

            if ui.selectable_label(self.view == View::Planner, "Plan").clicked() {
                go_to = Some(View::Planner);
            }
            let day_enabled = self.schedule.is_some();
            if ui
                .add_enabled(
                    day_enabled,
                    egui::SelectableLabel::new(self.view == View::Schedule, "Day"),
                )
                .clicked()
            {
                go_to = Some(View::Schedule);
            }
            if ui.selectable_label(self.view == View::Board, "Our schedules").clicked() {
                go_to = Some(View::Board);
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button(egui_phosphor::regular::GEAR).on_hover_text("Settings").clicked() {
                    settings_clicked = true;
                }
                for (i, name) in self.config.partners.iter().enumerate().rev() {
                    if ui.selectable_label(self.config.current_user == i, name).clicked() {
                        switch_user = Some(i);
                    }
                }
                ui.label(RichText::new("I am").color(theme::card_colors().2));

                if self.is_offline {
                    ui.label(
                        RichText::new(format!("{} Offline", egui_phosphor::regular::WIFI_SLASH))
                            .color(theme::ERROR),
                    );
                } else if !self.config.is_configured() {
                    ui.label(RichText::new("Local only").color(theme::card_colors().2))
                        .on_hover_text("No backend configured; nothing is shared");
                }
                if let Some(msg) = &self.status_message {
                    ui.label(RichText::new(msg).color(theme::ERROR));
                }
            });
        });

        if let Some(i) = switch_user {
            if self.config.current_user != i {
                tracing::info!(user = %self.config.partners[i], "switching current user");
                self.config.current_user = i;
                self.persist_config();
            }
        }
        if settings_clicked {
            self.open_settings();
        }
        match go_to {
            Some(View::Board) => self.open_board(),
            Some(view) => self.view = view,
            None => {}
        }
    }

    fn render_planner(&mut self, ui: &mut egui::Ui) {
        let mut edit = None;
        let mut build = false;
        let mut reset = false;
        let home = self.config.home_place.clone();
        let away = self.config.away_place.clone();

        ui.horizontal(|ui| {
            for direction in Direction::ALL {
                if views::pill(ui, &direction.label(&home, &away), self.direction == direction) {
                    self.direction = direction;
                }
            }
        });
        ui.add_space(12.0);

        if self.plans_loading {
            views::loading_row(ui, "Loading our plans…");
            return;
        }

        let direction = self.direction;
        let plan = self.plans.get(direction).clone();
        let destination = direction.destination(&home, &away).to_string();

        if plan.locked {
            ui.label(RichText::new(format!("Locked in for {}", destination)).size(18.0).strong());
            ui.add_space(6.0);
            egui::Grid::new("plan_summary")
                .num_columns(2)
                .spacing([20.0, 8.0])
                .show(ui, |ui| {
                    ui.label("What we do");
                    ui.label(plan.activities.join(", "));
                    ui.end_row();
                    ui.label("The vibe");
                    ui.label(&plan.vibe);
                    ui.end_row();
                    ui.label("What we eat");
                    ui.label(plan.foods.join(", "));
                    ui.end_row();
                });
            ui.add_space(12.0);
            ui.horizontal(|ui| {
                let build_text = format!("{} Build our day", egui_phosphor::regular::CALENDAR_PLUS);
                if ui.button(build_text).clicked() {
                    build = true;
                }
                if ui.button("Start new plan").clicked() {
                    reset = true;
                }
            });
        } else {
            if let Some(values) = views::render_multi_group(
                ui,
                "What do we do?",
                "Pick as many as you like.",
                ACTIVITIES,
                &plan.activities,
                &mut self.staged_activity,
                "Something else? Press Enter to add",
            ) {
                edit = Some(PlanEdit::Activities(values));
            }
            ui.add_space(14.0);

            if let Some(value) = views::render_single_group(
                ui,
                "What's the vibe?",
                "Just one.",
                VIBES,
                &plan.vibe,
                "Describe the vibe",
            ) {
                edit = Some(PlanEdit::Vibe(value));
            }
            ui.add_space(14.0);

            if let Some(values) = views::render_multi_group(
                ui,
                "What do we eat?",
                "Pick as many as you like.",
                FOODS,
                &plan.foods,
                &mut self.staged_food,
                "Craving something else? Press Enter to add",
            ) {
                edit = Some(PlanEdit::Foods(values));
            }
            ui.add_space(18.0);

            let lock = ui
                .add_enabled(
                    plan.can_lock(),
                    egui::Button::new(format!("{} Lock it in", egui_phosphor::regular::LOCK)),
                )
                .on_disabled_hover_text("Pick at least one activity, a vibe, and one food first");
            if lock.clicked() {
                edit = Some(PlanEdit::Lock);
            }
        }

        if let Some(edit) = edit {
            self.apply_plan_edit(direction, edit);
        }
        if build {
            self.open_new_schedule(direction);
        }
        if reset {
            self.start_new_plan();
        }
    }

    fn render_schedule(&mut self, ui: &mut egui::Ui) {
        let home = self.config.home_place.clone();
        let away = self.config.away_place.clone();
        let Some(view) = self.schedule.as_mut() else {
            ui.label("No day open yet.");
            return;
        };

        let mut added = None;
        let mut outcome = None;
        let mut save = false;
        let mut like = None;
        let mut comment = None;

        let read_only = view.post.is_some();
        let title = match &view.post {
            Some(post) => post.title.clone().unwrap_or_else(|| {
                format!("{} • {}", post.day_label, view.direction.label(&home, &away))
            }),
            None => format!("{} • {}", DAY_LABEL, view.direction.label(&home, &away)),
        };
        ui.label(RichText::new(title).size(20.0).strong());

        if let Some(post) = &view.post {
            if let Some(author) = &post.author_name {
                ui.label(
                    RichText::new(format!("Made by {}", author)).color(theme::card_colors().2),
                );
            }
            if view.reactions.loading {
                views::loading_row(ui, "Loading reactions…");
            } else {
                ui.horizontal(|ui| {
                    if views::like_button(ui, view.reactions.liked) {
                        if let Some(liked) = view.reactions.toggle_like() {
                            like = Some((post.id.clone(), liked));
                        }
                    }
                });
                let draft = &mut view.reactions.draft;
                if views::render_comments(ui, &view.reactions.comments, draft) {
                    comment = Some((post.id.clone(), view.reactions.draft.clone()));
                }
            }
        }
        ui.add_space(10.0);

        if view.loading {
            views::loading_row(ui, "Loading the day…");
            return;
        }

        let plan = self.plans.get(view.direction).clone();
        ui.horizontal_top(|ui| {
            if !read_only {
                ui.vertical(|ui| {
                    ui.set_width(280.0);
                    added = views::render_palette(ui, &plan, &mut view.activity_duration);

                    ui.add_space(18.0);
                    let can_save = view.schedule_id.is_some() && !view.saving;
                    if ui
                        .add_enabled(
                            can_save,
                            egui::Button::new(format!(
                                "{} Save to our schedules",
                                egui_phosphor::regular::PUSH_PIN
                            )),
                        )
                        .clicked()
                    {
                        save = true;
                    }
                    if view.saving {
                        views::loading_row(ui, "Saving…");
                    }
                    if let Some(err) = &view.save_error {
                        ui.label(RichText::new(err).color(theme::ERROR));
                    }
                });
                ui.add_space(16.0);
            }
            ui.vertical(|ui| {
                outcome = views::render_schedule_column(ui, &mut view.blocks, &mut view.editor);
            });
        });

        if let Some((kind, label, minutes)) = added {
            self.add_block(kind, label, minutes);
        }
        if let Some(outcome) = outcome {
            self.apply_drag_outcome(outcome);
        }
        if save {
            self.save_to_board();
        }
        if let Some((post_id, liked)) = like {
            if let Some(card) = self.board.card_mut(&post_id) {
                card.liked = liked;
            }
            self.send_like(post_id, liked);
        }
        if let Some((post_id, draft)) = comment {
            self.send_comment(post_id, &draft);
        }
    }

    fn render_board(&mut self, ui: &mut egui::Ui) {
        let mut new_plan = false;
        ui.horizontal(|ui| {
            ui.label(RichText::new("Our schedules").size(20.0).strong());
            ui.add_space(16.0);
            new_plan = ui
                .button(format!("{} New plan", egui_phosphor::regular::PLUS))
                .clicked();
        });
        ui.add_space(8.0);

        if new_plan {
            self.start_new_plan();
            self.view = View::Planner;
            return;
        }

        if self.board.loading && self.board.cards.is_empty() {
            views::loading_row(ui, "Loading our schedules…");
            return;
        }
        if self.board.cards.is_empty() {
            ui.label(
                RichText::new("Nothing saved yet. Build a day and save it here.")
                    .color(theme::card_colors().2),
            );
            return;
        }

        let home = self.config.home_place.clone();
        let away = self.config.away_place.clone();
        let mut actions = Vec::new();
        for card in self.board.cards.iter_mut() {
            let label = card.post.direction.label(&home, &away);
            if let Some(action) = views::render_post_card(ui, card, &label) {
                actions.push((action, card.post.clone(), card.draft.clone()));
            }
        }

        for (action, post, draft) in actions {
            match action {
                CardAction::ToggleLike => {
                    if let Some(liked) = self.board.toggle_like(&post.id) {
                        self.send_like(post.id, liked);
                    }
                }
                CardAction::Open => self.open_preview(post),
                CardAction::Delete => self.pending_delete = Some(post),
                CardAction::SendComment => self.send_comment(post.id, &draft),
            }
        }
    }

    fn render_settings(&mut self, ui: &mut egui::Ui) {
        let section_color = Color32::from_rgb(140, 140, 160);
        let mut save = false;
        let mut cancel = false;

        ui.label(RichText::new("Backend").color(section_color).strong());
        ui.add_space(8.0);
        egui::Grid::new("backend_grid")
            .num_columns(2)
            .spacing([20.0, 10.0])
            .show(ui, |ui| {
                ui.label("Project URL");
                ui.add(
                    egui::TextEdit::singleline(&mut self.settings_url)
                        .hint_text("abc.supabase.co")
                        .desired_width(350.0),
                );
                ui.end_row();

                ui.label("Anon key");
                ui.add(
                    egui::TextEdit::singleline(&mut self.settings_key)
                        .password(true)
                        .hint_text("Leave blank to keep existing")
                        .desired_width(350.0),
                );
                ui.end_row();

                ui.label("Workspace");
                ui.add(
                    egui::TextEdit::singleline(&mut self.settings_workspace).desired_width(350.0),
                );
                ui.end_row();
            });

        ui.add_space(20.0);
        ui.label(RichText::new("Us").color(section_color).strong());
        ui.add_space(8.0);
        egui::Grid::new("people_grid")
            .num_columns(2)
            .spacing([20.0, 10.0])
            .show(ui, |ui| {
                ui.label("Partners");
                ui.horizontal(|ui| {
                    for name in self.settings_partners.iter_mut() {
                        ui.add(egui::TextEdit::singleline(name).desired_width(160.0));
                    }
                });
                ui.end_row();

                ui.label("Places");
                ui.horizontal(|ui| {
                    ui.add(
                        egui::TextEdit::singleline(&mut self.settings_home).desired_width(100.0),
                    );
                    ui.label("↔");
                    ui.add(
                        egui::TextEdit::singleline(&mut self.settings_away).desired_width(100.0),
                    );
                });
                ui.end_row();
            });

        ui.add_space(20.0);
        ui.label(RichText::new("Display").color(section_color).strong());
        ui.add_space(8.0);
        egui::Grid::new("display_grid")
            .num_columns(2)
            .spacing([20.0, 10.0])
            .show(ui, |ui| {
                ui.label("Font scale");
                ui.horizontal(|ui| {
                    ui.add(
                        egui::Slider::new(&mut self.settings_font_scale, 0.75..=2.0)
                            .show_value(false),
                    );
                    ui.label(format!("{:.0}%", self.settings_font_scale * 100.0));
                });
                ui.end_row();
            });

        ui.add_space(24.0);
        ui.horizontal(|ui| {
            save = views::pill(ui, "Save", false);
            cancel = views::pill(ui, "Cancel", false);
        });

        if save {
            self.save_settings();
        } else if cancel {
            self.show_settings = false;
        }
    }

    fn render_delete_confirm(&mut self, ctx: &egui::Context) {
        let Some(post) = self.pending_delete.clone() else {
            return;
        };
        let mut confirm = false;
        let mut cancel = false;

        egui::Window::new("Delete this day?")
            .collapsible(false)
            .resizable(false)
            .default_width(400.0)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.add_space(6.0);
                let title = post.title.clone().unwrap_or_else(|| post.day_label.clone());
                ui.label(RichText::new(title).strong());
                ui.label("Its blocks, likes, and comments go with it.");
                ui.add_space(12.0);
                ui.horizontal(|ui| {
                    if ui.button(RichText::new("Delete").color(theme::ERROR)).clicked() {
                        confirm = true;
                    }
                    if ui.button("Keep it").clicked() {
                        cancel = true;
                    }
                });
            });

        if confirm {
            self.pending_delete = None;
            self.delete_post(post);
        } else if cancel {
            self.pending_delete = None;
        }
    }
}

impl eframe::App for TripboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Pinch / ctrl+scroll zoom
        let zoom_delta = ctx.input(|i| i.zoom_delta());
        if zoom_delta != 1.0 {
            self.config.font_scale = (self.config.font_scale * zoom_delta).clamp(0.75, 2.5);
            if (zoom_delta - 1.0).abs() > 0.01 {
                self.persist_config();
            }
        }
        ctx.set_pixels_per_point(self.config.font_scale);

        self.check_async_results();

        egui::TopBottomPanel::top("top_bar")
            .frame(
                egui::Frame::none()
                    .fill(theme::card_colors().0)
                    .inner_margin(egui::Margin::symmetric(16.0, 10.0)),
            )
            .show(ctx, |ui| self.render_top_bar(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .drag_to_scroll(false)
                .auto_shrink([false, false])
                .show(ui, |ui| match self.view {
                    View::Planner => self.render_planner(ui),
                    View::Schedule => self.render_schedule(ui),
                    View::Board => self.render_board(ui),
                });
        });

        if self.show_settings {
            egui::Window::new("Settings")
                .collapsible(false)
                .resizable(false)
                .default_width(600.0)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| self.render_settings(ui));
        }

        self.render_delete_confirm(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::WorkspaceKey;

    fn block(id: i64, schedule: i64, start: i32) -> Block {
        Block {
            id: RowId::Int(id),
            schedule_id: RowId::Int(schedule),
            label: format!("b{}", id),
            kind: BlockKind::Do,
            day_index: 0,
            start_minutes: start,
            end_minutes: start + 30,
        }
    }

    fn schedule_row(id: i64) -> ScheduleRow {
        ScheduleRow {
            id: RowId::Int(id),
            profile_key: WorkspaceKey::new("us"),
            direction: Direction::NyuToIu,
            day_label: DAY_LABEL.to_string(),
        }
    }

    fn post(id: i64, schedule: i64) -> Post {
        Post {
            id: RowId::Int(id),
            schedule_id: RowId::Int(schedule),
            direction: Direction::IuToNyu,
            day_label: DAY_LABEL.to_string(),
            title: None,
            note: None,
            author_name: None,
            created_at: None,
        }
    }

    /// A fresh view whose schedule row already exists
    fn open_view(seq: u64, schedule: i64) -> ScheduleView {
        let mut view = ScheduleView::fresh(seq, Direction::NyuToIu);
        view.apply(ScheduleResult::Created(seq, schedule_row(schedule)));
        view
    }

    #[test]
    fn launches_on_the_board() {
        assert_eq!(View::default(), View::Board);
    }

    #[test]
    fn create_result_from_an_earlier_open_is_dropped() {
        let mut view = ScheduleView::fresh(2, Direction::NyuToIu);
        let applied = view.apply(ScheduleResult::Created(1, schedule_row(10)));
        assert_eq!(applied, Applied::Stale);
        assert_eq!(view.schedule_id, None);
        assert!(view.loading);

        assert_eq!(view.apply(ScheduleResult::Created(2, schedule_row(11))), Applied::Accepted);
        assert_eq!(view.schedule_id, Some(RowId::Int(11)));
        assert!(!view.loading);
    }

    #[test]
    fn blocks_for_another_schedule_are_dropped() {
        let mut view = open_view(1, 10);

        let other = vec![block(1, 99, 540)];
        let applied = view.apply(ScheduleResult::BlocksLoaded(RowId::Int(99), other));
        assert_eq!(applied, Applied::Stale);
        assert_eq!(view.apply(ScheduleResult::BlockAdded(block(2, 99, 600))), Applied::Stale);
        assert!(view.blocks.blocks().is_empty());

        assert_eq!(view.apply(ScheduleResult::BlockAdded(block(3, 10, 600))), Applied::Accepted);
        assert_eq!(view.blocks.blocks().len(), 1);
    }

    #[test]
    fn failed_save_shows_retry_message() {
        let mut view = open_view(1, 10);
        view.saving = true;

        assert_eq!(view.apply(ScheduleResult::SaveFailed(RowId::Int(10))), Applied::Accepted);
        assert!(!view.saving);
        assert_eq!(view.save_error.as_deref(), Some(SAVE_ERROR));
    }

    #[test]
    fn save_for_another_schedule_leaves_view_alone() {
        let mut view = open_view(1, 10);
        view.saving = true;

        assert_eq!(view.apply(ScheduleResult::SaveFailed(RowId::Int(7))), Applied::Stale);
        assert_eq!(view.apply(ScheduleResult::Saved(RowId::Int(7))), Applied::Stale);
        assert!(view.saving);
        assert_eq!(view.save_error, None);

        assert_eq!(view.apply(ScheduleResult::Saved(RowId::Int(10))), Applied::OpenBoard);
        assert!(!view.saving);
    }

    #[test]
    fn preview_waits_for_reactions() {
        let mut view = ScheduleView::preview(3, post(5, 20));
        assert!(view.editor.read_only());
        assert!(view.reactions.loading);
        assert_eq!(view.reactions.toggle_like(), None);

        let stale = Reactions {
            liked: true,
            ..Reactions::default()
        };
        let applied = view.apply(ScheduleResult::ReactionsLoaded(RowId::Int(6), stale));
        assert_eq!(applied, Applied::Stale);
        assert!(view.reactions.loading);

        let loaded = Reactions {
            liked: true,
            ..Reactions::default()
        };
        let applied = view.apply(ScheduleResult::ReactionsLoaded(RowId::Int(5), loaded));
        assert_eq!(applied, Applied::Accepted);
        assert!(!view.reactions.loading);
        assert_eq!(view.reactions.toggle_like(), Some(false));
    }

    #[test]
    fn load_failure_only_clears_its_own_view() {
        let mut view = ScheduleView::preview(4, post(5, 20));
        assert_eq!(view.apply(ScheduleResult::LoadFailed(3)), Applied::Stale);
        assert!(view.loading);
        assert_eq!(view.apply(ScheduleResult::LoadFailed(4)), Applied::Accepted);
        assert!(!view.loading);
    }

    #[test]
    fn write_failures_stay_quiet_while_online() {
        let rejected = || ApiError::Status {
            status: reqwest::StatusCode::BAD_REQUEST,
            body: String::new(),
        };

        assert!(failed(&rejected(), "updating like", LoadTarget::Write).is_none());
        assert!(matches!(
            failed(&rejected(), "loading board", LoadTarget::Board),
            Some(AsyncResult::Failed {
                target: LoadTarget::Board,
                offline: false
            })
        ));
        assert!(matches!(
            failed(&rejected(), "loading blocks", LoadTarget::Schedule(2)),
            Some(AsyncResult::Failed {
                target: LoadTarget::Schedule(2),
                offline: false
            })
        ));
    }
}

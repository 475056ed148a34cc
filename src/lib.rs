#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::too_many_lines)]

pub mod capabilities;
pub mod photo;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

pub use app::App;
pub use capabilities::{
    Capabilities, Effect, HttpError, HttpMethod, HttpOperation, HttpRequest, HttpResponse,
    HttpResult, LocationError, LocationOperation, LocationOutput, LocationResult, MediaError,
    MediaOperation, MediaOutput, MediaResult, MultipartForm, PhotoSource, PickConfig, PickedImage,
    Position, TimerId, TimerOperation, TimerOutcome,
};

pub const FEED_API_BASE: &str = "https://fastapi-event-api-66fji4lxba-uc.a.run.app";
pub const MAP_API_BASE: &str = "https://incident-api-66fji4lxba-uc.a.run.app";
pub const REPORT_API_BASE: &str = "https://incident-api-66fji4lxba-uc.a.run.app";

pub const DESCRIPTION_MAX_CHARS: usize = 200;
pub const SWIPE_DISMISS_FRACTION: f64 = 0.25;
pub const SWIPE_DISMISS_DURATION_MS: u64 = 200;
pub const REGION_DEBOUNCE_MS: u64 = 1000;
pub const MAP_LATITUDE_DELTA: f64 = 0.05;
pub const HEADER_TRANSITION_MS: u64 = 300;
pub const HEADER_SLIDE_FROM_Y: f64 = -10.0;
pub const TOAST_FADE_MS: u64 = 300;
pub const TOAST_SUCCESS_HOLD_MS: u64 = 2000;
pub const TOAST_ERROR_HOLD_MS: u64 = 3500;
pub const DEFAULT_SCREEN_WIDTH: f64 = 375.0;
pub const DEFAULT_SCREEN_HEIGHT: f64 = 812.0;

pub const MAP_ICON_CATEGORIES: &[&str] = &[
    "music", "tech", "shopping", "comedy", "movie", "sports", "fitness", "food", "party",
];
pub const DEFAULT_MAP_ICON: &str = "default";

pub const FEED_LINK_ACTION_LABEL: &str = "View Original Source";
pub const MARKER_CALLOUT_ACTION_LABEL: &str = "View Details";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TabRoute {
    Map,
    #[default]
    Feed,
    Report,
}

impl TabRoute {
    #[must_use]
    pub const fn all() -> [TabRoute; 3] {
        [TabRoute::Map, TabRoute::Feed, TabRoute::Report]
    }

    #[must_use]
    pub const fn path(&self) -> &'static str {
        match self {
            TabRoute::Map => "/map",
            TabRoute::Feed => "/",
            TabRoute::Report => "/report",
        }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            TabRoute::Map => "Map Dashboard",
            TabRoute::Feed => "Feed",
            TabRoute::Report => "Report Incident",
        }
    }

    #[must_use]
    pub const fn icon(&self) -> &'static str {
        match self {
            TabRoute::Map => "map-outline",
            TabRoute::Feed => "list-outline",
            TabRoute::Report => "document-text-outline",
        }
    }

    #[must_use]
    pub const fn icon_active(&self) -> &'static str {
        match self {
            TabRoute::Map => "map",
            TabRoute::Feed => "list",
            TabRoute::Report => "document-text",
        }
    }

    /// Exact path match only; `/mapx` is nobody's tab.
    #[must_use]
    pub fn from_path(path: &str) -> Option<TabRoute> {
        TabRoute::all().into_iter().find(|r| r.path() == path)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum IncidentCategory {
    #[default]
    Pothole,
    Accident,
    Roadblock,
    WaterLogging,
    Other,
}

impl IncidentCategory {
    #[must_use]
    pub const fn all() -> [IncidentCategory; 5] {
        [
            IncidentCategory::Pothole,
            IncidentCategory::Accident,
            IncidentCategory::Roadblock,
            IncidentCategory::WaterLogging,
            IncidentCategory::Other,
        ]
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            IncidentCategory::Pothole => "pothole",
            IncidentCategory::Accident => "accident",
            IncidentCategory::Roadblock => "roadblock",
            IncidentCategory::WaterLogging => "water logging",
            IncidentCategory::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedSource {
    #[default]
    Jurisdiction,
    City,
}

impl FeedSource {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            FeedSource::Jurisdiction => "jurisdiction",
            FeedSource::City => "city",
        }
    }
}

/// One reported incident as served by the feed API. Every field is tolerated
/// missing; `id` accepts either a JSON string or a number.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FeedItem {
    #[serde(default, deserialize_with = "flexible_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub event_type: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    #[serde(skip)]
    pub source: FeedSource,
}

impl FeedItem {
    /// Stable list key: `{id}-{source}`, or the position for items the
    /// server sent without an id.
    #[must_use]
    pub fn display_key(&self, index: usize) -> String {
        if self.id.is_empty() {
            index.to_string()
        } else {
            format!("{}-{}", self.id, self.source.as_str())
        }
    }
}

fn flexible_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Int(i64),
        Unsigned(u64),
        Null,
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Int(n) => n.to_string(),
        RawId::Unsigned(n) => n.to_string(),
        RawId::Null => String::new(),
    })
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LookupIncidentsResponse {
    #[serde(default)]
    pub jurisdiction_incidents: Vec<FeedItem>,
    #[serde(default)]
    pub city_incidents: Vec<FeedItem>,
}

impl LookupIncidentsResponse {
    /// Jurisdiction items first, then city items, each tagged with the
    /// sub-list it came from.
    #[must_use]
    pub fn into_items(self) -> Vec<FeedItem> {
        let mut items = self.jurisdiction_incidents;
        for item in &mut items {
            item.source = FeedSource::Jurisdiction;
        }
        items.extend(self.city_incidents.into_iter().map(|mut item| {
            item.source = FeedSource::City;
            item
        }));
        items
    }
}

/// One group in the events-nearby response. The category lives in
/// `event_type` with `type` as a legacy fallback.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventGroup {
    pub event_type: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub events: Vec<MapEvent>,
}

impl EventGroup {
    #[must_use]
    pub fn category(&self) -> String {
        self.event_type
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.kind.as_deref().filter(|s| !s.is_empty()))
            .unwrap_or("")
            .to_string()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MapEvent {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub datetime: String,
    #[serde(default)]
    pub link: String,
}

/// A plotted map point. Identity for dedup purposes is the coordinate
/// display string, not the content.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub latitude: f64,
    pub longitude: f64,
    pub content: String,
    pub location: String,
    pub datetime: String,
    pub link: String,
    pub category: String,
}

impl Annotation {
    #[must_use]
    pub fn coordinate_key(&self) -> String {
        format!("{},{}", self.latitude, self.longitude)
    }
}

/// Flattens response groups into annotations. Events without both
/// coordinates are dropped.
#[must_use]
pub fn flatten_event_groups(groups: Vec<EventGroup>) -> Vec<Annotation> {
    let mut annotations = Vec::new();
    for group in groups {
        let category = group.category();
        for event in group.events {
            let (Some(latitude), Some(longitude)) = (event.lat, event.lng) else {
                continue;
            };
            annotations.push(Annotation {
                latitude,
                longitude,
                content: event.title,
                location: event.location,
                datetime: event.datetime,
                link: event.link,
                category: category.clone(),
            });
        }
    }
    annotations
}

/// Icon for a map marker: unmapped categories borrow the first table entry.
#[must_use]
pub fn marker_icon(category: &str) -> &str {
    if MAP_ICON_CATEGORIES.contains(&category) {
        category
    } else {
        MAP_ICON_CATEGORIES[0]
    }
}

/// Icon for a filter chip: unmapped categories use the generic icon.
#[must_use]
pub fn chip_icon(category: &str) -> &str {
    if MAP_ICON_CATEGORIES.contains(&category) {
        category
    } else {
        DEFAULT_MAP_ICON
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapRegion {
    pub latitude: f64,
    pub longitude: f64,
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

impl MapRegion {
    #[must_use]
    pub fn centered_on(position: Position, screen: ScreenSize) -> Self {
        Self {
            latitude: position.latitude,
            longitude: position.longitude,
            latitude_delta: MAP_LATITUDE_DELTA,
            longitude_delta: MAP_LATITUDE_DELTA * screen.aspect_ratio(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenSize {
    pub width: f64,
    pub height: f64,
}

impl Default for ScreenSize {
    fn default() -> Self {
        Self {
            width: DEFAULT_SCREEN_WIDTH,
            height: DEFAULT_SCREEN_HEIGHT,
        }
    }
}

impl ScreenSize {
    #[must_use]
    pub fn aspect_ratio(&self) -> f64 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            DEFAULT_SCREEN_WIDTH / DEFAULT_SCREEN_HEIGHT
        }
    }

    #[must_use]
    pub fn swipe_dismiss_threshold(&self) -> f64 {
        self.width * SWIPE_DISMISS_FRACTION
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToastKind {
    Success,
    Error,
}

impl ToastKind {
    #[must_use]
    pub const fn hold_ms(&self) -> u64 {
        match self {
            ToastKind::Success => TOAST_SUCCESS_HOLD_MS,
            ToastKind::Error => TOAST_ERROR_HOLD_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActiveToast {
    pub id: u64,
    pub message: String,
    pub kind: ToastKind,
    pub timer: TimerId,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PermissionState {
    #[default]
    Unknown,
    Requesting,
    Granted,
    Denied,
}

/// A normalized photo waiting to ride along with the next submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedPhoto {
    pub uri: String,
    pub file_name: String,
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapAlert {
    pub title: String,
    pub message: String,
}

impl MapAlert {
    #[must_use]
    pub fn location_denied() -> Self {
        Self {
            title: "Permission denied".to_string(),
            message: "Location access is required.".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipePhase {
    Dragging,
    Dismissing,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActiveSwipe {
    pub key: String,
    pub offset_x: f64,
    pub phase: SwipePhase,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingRegionFetch {
    pub timer: TimerId,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedState {
    pub mount_seq: u64,
    pub items: Vec<FeedItem>,
    pub is_loading: bool,
    pub is_refreshing: bool,
    pub expanded: HashSet<String>,
    pub swipe: Option<ActiveSwipe>,
}

impl FeedState {
    fn remount(&mut self) {
        *self = Self {
            mount_seq: self.mount_seq + 1,
            ..Self::default()
        };
    }

    #[must_use]
    pub fn item_for_key(&self, key: &str) -> Option<&FeedItem> {
        self.items
            .iter()
            .enumerate()
            .find(|(index, item)| item.display_key(*index) == key)
            .map(|(_, item)| item)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapState {
    pub mount_seq: u64,
    pub region: Option<MapRegion>,
    pub annotations: Vec<Annotation>,
    pub seen_keys: HashSet<String>,
    pub all_categories: Vec<String>,
    pub selected_categories: Vec<String>,
    pub map_ready: bool,
    pub pending_fetch: Option<PendingRegionFetch>,
    pub alert: Option<MapAlert>,
}

impl MapState {
    fn remount(&mut self) {
        *self = Self {
            mount_seq: self.mount_seq + 1,
            ..Self::default()
        };
    }

    /// Appends a fetched batch. Annotations whose coordinate string was seen
    /// before (in this batch or any earlier one) are dropped. Categories from
    /// the whole batch, deduped ones included, join `all_categories`; the
    /// selection auto-populates from the batch only while it is empty.
    pub fn absorb_batch(&mut self, batch: Vec<Annotation>) {
        let selection_was_empty = self.selected_categories.is_empty();
        let mut batch_categories: Vec<String> = Vec::new();

        for annotation in batch {
            if !batch_categories.contains(&annotation.category) {
                batch_categories.push(annotation.category.clone());
            }
            if self.seen_keys.insert(annotation.coordinate_key()) {
                self.annotations.push(annotation);
            }
        }

        for category in &batch_categories {
            if !self.all_categories.contains(category) {
                self.all_categories.push(category.clone());
            }
        }

        if selection_was_empty {
            self.selected_categories = batch_categories;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportState {
    pub mount_seq: u64,
    pub description: String,
    pub category: IncidentCategory,
    pub photo: Option<StagedPhoto>,
    pub is_submitting: bool,
}

impl ReportState {
    fn remount(&mut self) {
        *self = Self {
            mount_seq: self.mount_seq + 1,
            ..Self::default()
        };
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Model {
    pub active_tab: TabRoute,
    pub header_epoch: u64,
    pub screen: ScreenSize,
    pub feed: FeedState,
    pub map: MapState,
    pub report: ReportState,
    pub toast: Option<ActiveToast>,
    pub location_permission: PermissionState,
    pub camera_permission: PermissionState,
    pub gallery_permission: PermissionState,
    toast_counter: u64,
    timer_counter: u64,
}

impl Model {
    pub fn next_timer_id(&mut self) -> TimerId {
        self.timer_counter += 1;
        TimerId(self.timer_counter)
    }

    fn next_toast_id(&mut self) -> u64 {
        self.toast_counter += 1;
        self.toast_counter
    }

    pub fn photo_permission_mut(&mut self, source: PhotoSource) -> &mut PermissionState {
        match source {
            PhotoSource::Camera => &mut self.camera_permission,
            PhotoSource::Gallery => &mut self.gallery_permission,
        }
    }
}

/// Truncation matches the input cap the shell enforces; the core re-applies
/// it so oversized shell events cannot overflow the draft.
#[must_use]
pub fn clamp_description(text: &str) -> String {
    text.chars().take(DESCRIPTION_MAX_CHARS).collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum Event {
    #[default]
    Noop,
    AppStarted,
    ScreenSizeChanged {
        width: f64,
        height: f64,
    },
    TabSelected(TabRoute),
    ToastExpired {
        toast_id: u64,
        outcome: TimerOutcome,
    },
    ToastDismissed,

    FeedRefreshPulled,
    FeedPermissionUpdated {
        mount_seq: u64,
        result: LocationResult,
    },
    FeedPositionUpdated {
        mount_seq: u64,
        result: LocationResult,
    },
    FeedIncidentsFetched {
        mount_seq: u64,
        result: Box<HttpResult>,
    },
    FeedCardToggled {
        key: String,
    },
    FeedSwipeMoved {
        key: String,
        translation_x: f64,
    },
    FeedSwipeReleased {
        key: String,
        translation_x: f64,
    },
    FeedDismissAnimationFinished {
        key: String,
    },
    FeedDeleteCompleted {
        id: String,
        result: Box<HttpResult>,
    },

    MapPermissionUpdated {
        mount_seq: u64,
        result: LocationResult,
    },
    MapPositionUpdated {
        mount_seq: u64,
        result: LocationResult,
    },
    MapReady,
    MapRegionChanged {
        latitude: f64,
        longitude: f64,
    },
    MapDebounceFired {
        mount_seq: u64,
        timer: TimerId,
        outcome: TimerOutcome,
    },
    MapEventsFetched {
        mount_seq: u64,
        result: Box<HttpResult>,
    },
    MapCategoryToggled {
        category: String,
    },
    MapAlertDismissed,

    ReportDescriptionChanged {
        text: String,
    },
    ReportCategoryChanged {
        category: IncidentCategory,
    },
    ReportPhotoRequested {
        source: PhotoSource,
    },
    ReportPhotoPermissionUpdated {
        mount_seq: u64,
        source: PhotoSource,
        result: MediaResult,
    },
    ReportPhotoPicked {
        mount_seq: u64,
        result: Box<MediaResult>,
    },
    ReportSubmitted,
    ReportPermissionUpdated {
        mount_seq: u64,
        result: LocationResult,
    },
    ReportPositionUpdated {
        mount_seq: u64,
        result: LocationResult,
    },
    ReportSubmissionCompleted {
        mount_seq: u64,
        result: Box<HttpResult>,
    },
}

impl Event {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Event::Noop => "noop",
            Event::AppStarted => "app_started",
            Event::ScreenSizeChanged { .. } => "screen_size_changed",
            Event::TabSelected(_) => "tab_selected",
            Event::ToastExpired { .. } => "toast_expired",
            Event::ToastDismissed => "toast_dismissed",
            Event::FeedRefreshPulled => "feed_refresh_pulled",
            Event::FeedPermissionUpdated { .. } => "feed_permission_updated",
            Event::FeedPositionUpdated { .. } => "feed_position_updated",
            Event::FeedIncidentsFetched { .. } => "feed_incidents_fetched",
            Event::FeedCardToggled { .. } => "feed_card_toggled",
            Event::FeedSwipeMoved { .. } => "feed_swipe_moved",
            Event::FeedSwipeReleased { .. } => "feed_swipe_released",
            Event::FeedDismissAnimationFinished { .. } => "feed_dismiss_animation_finished",
            Event::FeedDeleteCompleted { .. } => "feed_delete_completed",
            Event::MapPermissionUpdated { .. } => "map_permission_updated",
            Event::MapPositionUpdated { .. } => "map_position_updated",
            Event::MapReady => "map_ready",
            Event::MapRegionChanged { .. } => "map_region_changed",
            Event::MapDebounceFired { .. } => "map_debounce_fired",
            Event::MapEventsFetched { .. } => "map_events_fetched",
            Event::MapCategoryToggled { .. } => "map_category_toggled",
            Event::MapAlertDismissed => "map_alert_dismissed",
            Event::ReportDescriptionChanged { .. } => "report_description_changed",
            Event::ReportCategoryChanged { .. } => "report_category_changed",
            Event::ReportPhotoRequested { .. } => "report_photo_requested",
            Event::ReportPhotoPermissionUpdated { .. } => "report_photo_permission_updated",
            Event::ReportPhotoPicked { .. } => "report_photo_picked",
            Event::ReportSubmitted => "report_submitted",
            Event::ReportPermissionUpdated { .. } => "report_permission_updated",
            Event::ReportPositionUpdated { .. } => "report_position_updated",
            Event::ReportSubmissionCompleted { .. } => "report_submission_completed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewModel {
    pub header: HeaderView,
    pub tab_bar: Vec<TabItemView>,
    pub screen: ScreenView,
    pub toast: Option<ToastView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeaderView {
    pub title: String,
    /// Bumps on every navigation; the shell replays the fade/slide when it
    /// changes.
    pub epoch: u64,
    pub fade_in_ms: u64,
    pub slide_from_y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabItemView {
    pub path: String,
    pub label: String,
    pub icon: String,
    pub icon_active: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum ScreenView {
    Feed(FeedView),
    Map(MapView),
    Report(ReportView),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedView {
    pub is_loading: bool,
    pub is_refreshing: bool,
    pub cards: Vec<FeedCardView>,
    pub empty: Option<EmptyFeedView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmptyFeedView {
    pub title: String,
    pub hint: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedCardView {
    pub key: String,
    pub title: String,
    pub summary: String,
    pub link: String,
    pub link_action: String,
    pub event_type: String,
    pub expanded: bool,
    pub swipe_offset_x: f64,
    pub dismiss: Option<DismissAnimationView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DismissAnimationView {
    pub target_offset_x: f64,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapView {
    pub alert: Option<MapAlert>,
    pub region: Option<MapRegion>,
    pub markers: Vec<MarkerView>,
    pub filters: Vec<FilterChipView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerView {
    pub latitude: f64,
    pub longitude: f64,
    pub icon: String,
    pub title: String,
    pub location: String,
    pub datetime: String,
    pub link: String,
    pub callout_action: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterChipView {
    pub category: String,
    pub icon: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportView {
    pub description: String,
    pub description_limit: usize,
    pub categories: Vec<String>,
    pub selected_category: String,
    pub photo: Option<PhotoPreviewView>,
    pub is_submitting: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoPreviewView {
    pub uri: String,
    pub file_name: String,
    pub width: u32,
    pub height: u32,
    pub byte_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToastView {
    pub message: String,
    pub kind: ToastKind,
    pub fade_ms: u64,
    pub hold_ms: u64,
}

pub mod app {
    use super::*;
    use crate::capabilities::Capabilities;
    use tracing::{debug, error, warn};

    #[derive(Default)]
    pub struct App;

    impl App {
        fn mount_active_screen(model: &mut Model, caps: &Capabilities) {
            match model.active_tab {
                TabRoute::Feed => Self::mount_feed(model, caps),
                TabRoute::Map => Self::mount_map(model, caps),
                TabRoute::Report => model.report.remount(),
            }
        }

        fn mount_feed(model: &mut Model, caps: &Capabilities) {
            model.feed.remount();
            model.feed.is_loading = true;
            Self::request_feed_location(model, caps);
        }

        fn request_feed_location(model: &mut Model, caps: &Capabilities) {
            let mount_seq = model.feed.mount_seq;
            model.location_permission = PermissionState::Requesting;
            caps.location
                .request_permission(move |result| Event::FeedPermissionUpdated {
                    mount_seq,
                    result,
                });
        }

        fn finish_feed_load(model: &mut Model) {
            model.feed.is_loading = false;
            model.feed.is_refreshing = false;
        }

        fn mount_map(model: &mut Model, caps: &Capabilities) {
            Self::cancel_region_debounce(model, caps);
            model.map.remount();
            let mount_seq = model.map.mount_seq;
            model.location_permission = PermissionState::Requesting;
            caps.location
                .request_permission(move |result| Event::MapPermissionUpdated {
                    mount_seq,
                    result,
                });
        }

        fn cancel_region_debounce(model: &mut Model, caps: &Capabilities) {
            if let Some(pending) = model.map.pending_fetch.take() {
                caps.timer.cancel(pending.timer);
            }
        }

        fn send_map_fetch(model: &Model, caps: &Capabilities, latitude: f64, longitude: f64) {
            let mount_seq = model.map.mount_seq;
            let url =
                format!("{MAP_API_BASE}/events-nearby?latitude={latitude}&longitude={longitude}");
            caps.http.get(url).send(move |result| Event::MapEventsFetched {
                mount_seq,
                result: Box::new(result),
            });
        }

        fn submit_report(model: &Model, caps: &Capabilities, position: Position) {
            let report = &model.report;

            let mut form = MultipartForm::new();
            form.text("description", report.description.clone());
            form.text("event_type", report.category.as_str());
            form.text(
                "location",
                serde_json::json!({
                    "latitude": position.latitude,
                    "longitude": position.longitude,
                })
                .to_string(),
            );
            form.text("timestamp", Self::current_time_ms().to_string());
            if let Some(photo) = &report.photo {
                form.file(
                    "images",
                    photo.file_name.clone(),
                    "image/jpeg",
                    photo.data.clone(),
                );
            }

            let mount_seq = report.mount_seq;
            caps.http
                .post(format!("{REPORT_API_BASE}/report-incident"))
                .multipart(&form)
                .send(move |result| Event::ReportSubmissionCompleted {
                    mount_seq,
                    result: Box::new(result),
                });
        }

        fn current_time_ms() -> u64 {
            use std::time::{SystemTime, UNIX_EPOCH};
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        }

        fn show_toast(model: &mut Model, caps: &Capabilities, message: &str, kind: ToastKind) {
            if let Some(previous) = model.toast.take() {
                caps.timer.cancel(previous.timer);
            }
            let toast_id = model.next_toast_id();
            let timer = model.next_timer_id();
            model.toast = Some(ActiveToast {
                id: toast_id,
                message: message.to_string(),
                kind,
                timer,
            });
            let lifetime = TOAST_FADE_MS + kind.hold_ms() + TOAST_FADE_MS;
            caps.timer.start(timer, lifetime, move |outcome| Event::ToastExpired {
                toast_id,
                outcome,
            });
        }

        fn dismiss_toast(model: &mut Model, caps: &Capabilities) {
            if let Some(toast) = model.toast.take() {
                caps.timer.cancel(toast.timer);
            }
        }

        const fn photo_permission_toast(source: PhotoSource) -> &'static str {
            match source {
                PhotoSource::Camera => "Camera permission is required.",
                PhotoSource::Gallery => "Gallery permission is required.",
            }
        }

        fn build_feed_view(model: &Model) -> FeedView {
            let feed = &model.feed;
            let cards: Vec<FeedCardView> = feed
                .items
                .iter()
                .enumerate()
                .map(|(index, item)| {
                    let key = item.display_key(index);
                    let (swipe_offset_x, dismiss) = match &feed.swipe {
                        Some(swipe) if swipe.key == key => {
                            let dismiss = (swipe.phase == SwipePhase::Dismissing).then(|| {
                                DismissAnimationView {
                                    target_offset_x: model.screen.width,
                                    duration_ms: SWIPE_DISMISS_DURATION_MS,
                                }
                            });
                            (swipe.offset_x, dismiss)
                        }
                        _ => (0.0, None),
                    };
                    FeedCardView {
                        expanded: feed.expanded.contains(&key),
                        key,
                        title: item.title.clone(),
                        summary: item.summary.clone(),
                        link: item.link.clone(),
                        link_action: FEED_LINK_ACTION_LABEL.to_string(),
                        event_type: item.event_type.clone(),
                        swipe_offset_x,
                        dismiss,
                    }
                })
                .collect();

            FeedView {
                is_loading: feed.is_loading,
                is_refreshing: feed.is_refreshing,
                empty: (cards.is_empty() && !feed.is_loading).then(|| EmptyFeedView {
                    title: "No feeds available!".to_string(),
                    hint: "Pull down to refresh.".to_string(),
                }),
                cards,
            }
        }

        fn build_map_view(model: &Model) -> MapView {
            let map = &model.map;
            MapView {
                alert: map.alert.clone(),
                region: map.region,
                markers: map
                    .annotations
                    .iter()
                    .filter(|a| map.selected_categories.contains(&a.category))
                    .map(|a| MarkerView {
                        latitude: a.latitude,
                        longitude: a.longitude,
                        icon: marker_icon(&a.category).to_string(),
                        title: a.content.clone(),
                        location: a.location.clone(),
                        datetime: a.datetime.clone(),
                        link: a.link.clone(),
                        callout_action: MARKER_CALLOUT_ACTION_LABEL.to_string(),
                    })
                    .collect(),
                filters: map
                    .all_categories
                    .iter()
                    .map(|category| FilterChipView {
                        category: category.clone(),
                        icon: chip_icon(category).to_string(),
                        selected: map.selected_categories.contains(category),
                    })
                    .collect(),
            }
        }

        fn build_report_view(model: &Model) -> ReportView {
            let report = &model.report;
            ReportView {
                description: report.description.clone(),
                description_limit: DESCRIPTION_MAX_CHARS,
                categories: IncidentCategory::all()
                    .iter()
                    .map(|c| c.as_str().to_string())
                    .collect(),
                selected_category: report.category.as_str().to_string(),
                photo: report.photo.as_ref().map(|photo| PhotoPreviewView {
                    uri: photo.uri.clone(),
                    file_name: photo.file_name.clone(),
                    width: photo.width,
                    height: photo.height,
                    byte_count: photo.data.len() as u64,
                }),
                is_submitting: report.is_submitting,
            }
        }
    }

    impl crux_core::App for App {
        type Event = Event;
        type Model = Model;
        type ViewModel = ViewModel;
        type Capabilities = Capabilities;

        fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
            debug!(target: "shell", event = event.name(), "handling event");

            match event {
                Event::Noop => {}

                Event::AppStarted => {
                    model.header_epoch += 1;
                    Self::mount_active_screen(model, caps);
                    caps.render.render();
                }

                Event::ScreenSizeChanged { width, height } => {
                    if width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0 {
                        model.screen = ScreenSize { width, height };
                        caps.render.render();
                    }
                }

                Event::TabSelected(route) => {
                    debug!(target: "shell", route = route.path(), "tab selected");
                    Self::dismiss_toast(model, caps);
                    if model.active_tab == TabRoute::Map {
                        Self::cancel_region_debounce(model, caps);
                    }
                    model.active_tab = route;
                    model.header_epoch += 1;
                    Self::mount_active_screen(model, caps);
                    caps.render.render();
                }

                Event::ToastExpired { toast_id, outcome } => {
                    if outcome != TimerOutcome::Fired {
                        return;
                    }
                    if model.toast.as_ref().map(|t| t.id) == Some(toast_id) {
                        model.toast = None;
                        caps.render.render();
                    }
                }

                Event::ToastDismissed => {
                    if model.toast.is_some() {
                        Self::dismiss_toast(model, caps);
                        caps.render.render();
                    }
                }

                Event::FeedRefreshPulled => {
                    if model.feed.is_loading || model.feed.is_refreshing {
                        return;
                    }
                    model.feed.is_refreshing = true;
                    Self::request_feed_location(model, caps);
                    caps.render.render();
                }

                Event::FeedPermissionUpdated { mount_seq, result } => {
                    if mount_seq != model.feed.mount_seq {
                        return;
                    }
                    match result {
                        Ok(LocationOutput::Permission { granted: true }) => {
                            model.location_permission = PermissionState::Granted;
                            caps.location.get_position(move |result| {
                                Event::FeedPositionUpdated { mount_seq, result }
                            });
                        }
                        Ok(LocationOutput::Permission { granted: false }) => {
                            model.location_permission = PermissionState::Denied;
                            warn!(target: "feed", "location permission not granted");
                            Self::finish_feed_load(model);
                            caps.render.render();
                        }
                        Ok(_) => {
                            warn!(target: "feed", "unexpected location output");
                            Self::finish_feed_load(model);
                            caps.render.render();
                        }
                        Err(e) => {
                            model.location_permission = PermissionState::Unknown;
                            warn!(target: "feed", error = %e, "permission request failed");
                            Self::finish_feed_load(model);
                            caps.render.render();
                        }
                    }
                }

                Event::FeedPositionUpdated { mount_seq, result } => {
                    if mount_seq != model.feed.mount_seq {
                        return;
                    }
                    match result {
                        Ok(LocationOutput::Position(position)) if position.is_valid() => {
                            let url = format!(
                                "{FEED_API_BASE}/lookup_incidents?lat={}&lng={}",
                                position.latitude, position.longitude
                            );
                            caps.http.get(url).send(move |result| {
                                Event::FeedIncidentsFetched {
                                    mount_seq,
                                    result: Box::new(result),
                                }
                            });
                        }
                        Ok(LocationOutput::Position(position)) => {
                            error!(
                                target: "feed",
                                lat = position.latitude,
                                lng = position.longitude,
                                "implausible position"
                            );
                            Self::finish_feed_load(model);
                            caps.render.render();
                        }
                        Ok(_) => {
                            warn!(target: "feed", "unexpected location output");
                            Self::finish_feed_load(model);
                            caps.render.render();
                        }
                        Err(e) => {
                            error!(target: "feed", error = %e, "position lookup failed");
                            Self::finish_feed_load(model);
                            caps.render.render();
                        }
                    }
                }

                Event::FeedIncidentsFetched { mount_seq, result } => {
                    if mount_seq != model.feed.mount_seq {
                        return;
                    }
                    Self::finish_feed_load(model);
                    match *result {
                        Ok(response) if response.is_success() => {
                            match response.json::<LookupIncidentsResponse>() {
                                Ok(payload) => model.feed.items = payload.into_items(),
                                Err(e) => {
                                    warn!(target: "feed", error = %e, "malformed incidents payload");
                                }
                            }
                        }
                        Ok(response) => {
                            warn!(
                                target: "feed",
                                status = response.status(),
                                "incident lookup failed"
                            );
                        }
                        Err(e) => warn!(target: "feed", error = %e, "incident lookup failed"),
                    }
                    caps.render.render();
                }

                Event::FeedCardToggled { key } => {
                    if !model.feed.expanded.remove(&key) {
                        model.feed.expanded.insert(key);
                    }
                    caps.render.render();
                }

                Event::FeedSwipeMoved {
                    key,
                    translation_x,
                } => {
                    if let Some(swipe) = model.feed.swipe.as_mut().filter(|s| s.key == key) {
                        if swipe.phase == SwipePhase::Dismissing {
                            return;
                        }
                        if translation_x > 0.0 {
                            swipe.offset_x = translation_x;
                            caps.render.render();
                        }
                    } else {
                        let dismissing = matches!(
                            &model.feed.swipe,
                            Some(s) if s.phase == SwipePhase::Dismissing
                        );
                        if translation_x > 0.0 && !dismissing {
                            model.feed.swipe = Some(ActiveSwipe {
                                key,
                                offset_x: translation_x,
                                phase: SwipePhase::Dragging,
                            });
                            caps.render.render();
                        }
                    }
                }

                Event::FeedSwipeReleased {
                    key,
                    translation_x,
                } => {
                    let threshold = model.screen.swipe_dismiss_threshold();
                    let Some(swipe) = model
                        .feed
                        .swipe
                        .as_mut()
                        .filter(|s| s.key == key && s.phase == SwipePhase::Dragging)
                    else {
                        return;
                    };
                    if translation_x > threshold {
                        swipe.phase = SwipePhase::Dismissing;
                    } else {
                        model.feed.swipe = None;
                    }
                    caps.render.render();
                }

                Event::FeedDismissAnimationFinished { key } => {
                    let matches_dismissal = matches!(
                        &model.feed.swipe,
                        Some(s) if s.key == key && s.phase == SwipePhase::Dismissing
                    );
                    if !matches_dismissal {
                        return;
                    }
                    model.feed.swipe = None;

                    let Some(id) = model.feed.item_for_key(&key).map(|item| item.id.clone())
                    else {
                        caps.render.render();
                        return;
                    };

                    model.feed.items.retain(|item| item.id != id);
                    if id.is_empty() {
                        // Positional card: nothing to address server-side.
                        debug!(target: "feed", "dismissed card without id");
                    } else {
                        let url = format!("{FEED_API_BASE}/feed/{id}");
                        caps.http.delete(url).send(move |result| {
                            Event::FeedDeleteCompleted {
                                id,
                                result: Box::new(result),
                            }
                        });
                    }
                    caps.render.render();
                }

                Event::FeedDeleteCompleted { id, result } => match *result {
                    Ok(response) if response.is_success() => {
                        debug!(target: "feed", id = %id, "incident delete acknowledged");
                    }
                    Ok(response) => {
                        warn!(
                            target: "feed",
                            id = %id,
                            status = response.status(),
                            "incident delete rejected"
                        );
                    }
                    Err(e) => warn!(target: "feed", id = %id, error = %e, "incident delete failed"),
                },

                Event::MapPermissionUpdated { mount_seq, result } => {
                    if mount_seq != model.map.mount_seq {
                        return;
                    }
                    match result {
                        Ok(LocationOutput::Permission { granted: true }) => {
                            model.location_permission = PermissionState::Granted;
                            caps.location.get_position(move |result| {
                                Event::MapPositionUpdated { mount_seq, result }
                            });
                        }
                        Ok(LocationOutput::Permission { granted: false }) => {
                            model.location_permission = PermissionState::Denied;
                            warn!(target: "map", "location permission not granted");
                            model.map.alert = Some(MapAlert::location_denied());
                            caps.render.render();
                        }
                        Ok(_) => warn!(target: "map", "unexpected location output"),
                        Err(e) => {
                            model.location_permission = PermissionState::Unknown;
                            warn!(target: "map", error = %e, "permission request failed");
                        }
                    }
                }

                Event::MapPositionUpdated { mount_seq, result } => {
                    if mount_seq != model.map.mount_seq {
                        return;
                    }
                    match result {
                        Ok(LocationOutput::Position(position)) if position.is_valid() => {
                            model.map.region =
                                Some(MapRegion::centered_on(position, model.screen));
                            Self::send_map_fetch(
                                model,
                                caps,
                                position.latitude,
                                position.longitude,
                            );
                            caps.render.render();
                        }
                        Ok(LocationOutput::Position(position)) => {
                            error!(
                                target: "map",
                                lat = position.latitude,
                                lng = position.longitude,
                                "implausible position"
                            );
                        }
                        Ok(_) => warn!(target: "map", "unexpected location output"),
                        Err(e) => error!(target: "map", error = %e, "initial position failed"),
                    }
                }

                Event::MapReady => {
                    model.map.map_ready = true;
                }

                Event::MapRegionChanged {
                    latitude,
                    longitude,
                } => {
                    if !model.map.map_ready || model.map.alert.is_some() {
                        return;
                    }
                    Self::cancel_region_debounce(model, caps);
                    let timer = model.next_timer_id();
                    let mount_seq = model.map.mount_seq;
                    model.map.pending_fetch = Some(PendingRegionFetch {
                        timer,
                        latitude,
                        longitude,
                    });
                    caps.timer.start(timer, REGION_DEBOUNCE_MS, move |outcome| {
                        Event::MapDebounceFired {
                            mount_seq,
                            timer,
                            outcome,
                        }
                    });
                }

                Event::MapDebounceFired {
                    mount_seq,
                    timer,
                    outcome,
                } => {
                    if mount_seq != model.map.mount_seq {
                        return;
                    }
                    let Some(pending) = model.map.pending_fetch else {
                        return;
                    };
                    if pending.timer != timer || outcome != TimerOutcome::Fired {
                        return;
                    }
                    model.map.pending_fetch = None;
                    Self::send_map_fetch(model, caps, pending.latitude, pending.longitude);
                }

                Event::MapEventsFetched { mount_seq, result } => {
                    if mount_seq != model.map.mount_seq {
                        return;
                    }
                    match *result {
                        Ok(response) if response.is_success() => {
                            match response.json::<Vec<EventGroup>>() {
                                Ok(groups) => {
                                    model.map.absorb_batch(flatten_event_groups(groups));
                                }
                                Err(e) => {
                                    warn!(target: "map", error = %e, "malformed events payload");
                                }
                            }
                        }
                        Ok(response) => {
                            warn!(target: "map", status = response.status(), "events fetch failed");
                        }
                        Err(e) => warn!(target: "map", error = %e, "events fetch failed"),
                    }
                    caps.render.render();
                }

                Event::MapCategoryToggled { category } => {
                    let selected = &mut model.map.selected_categories;
                    if let Some(index) = selected.iter().position(|c| c == &category) {
                        selected.remove(index);
                    } else {
                        selected.push(category);
                    }
                    caps.render.render();
                }

                Event::MapAlertDismissed => {
                    if model.map.alert.take().is_some() {
                        caps.render.render();
                    }
                }

                Event::ReportDescriptionChanged { text } => {
                    model.report.description = clamp_description(&text);
                    caps.render.render();
                }

                Event::ReportCategoryChanged { category } => {
                    model.report.category = category;
                    caps.render.render();
                }

                Event::ReportPhotoRequested { source } => {
                    *model.photo_permission_mut(source) = PermissionState::Requesting;
                    let mount_seq = model.report.mount_seq;
                    caps.media.request_permission(source, move |result| {
                        Event::ReportPhotoPermissionUpdated {
                            mount_seq,
                            source,
                            result,
                        }
                    });
                }

                Event::ReportPhotoPermissionUpdated {
                    mount_seq,
                    source,
                    result,
                } => {
                    if mount_seq != model.report.mount_seq {
                        return;
                    }
                    match result {
                        Ok(MediaOutput::Permission { granted: true }) => {
                            *model.photo_permission_mut(source) = PermissionState::Granted;
                            caps.media.pick_image(source, PickConfig::default(), move |result| {
                                Event::ReportPhotoPicked {
                                    mount_seq,
                                    result: Box::new(result),
                                }
                            });
                        }
                        Ok(MediaOutput::Permission { granted: false }) => {
                            *model.photo_permission_mut(source) = PermissionState::Denied;
                            warn!(target: "report", source = source.as_str(), "photo permission denied");
                            Self::show_toast(
                                model,
                                caps,
                                Self::photo_permission_toast(source),
                                ToastKind::Error,
                            );
                            caps.render.render();
                        }
                        Ok(_) => warn!(target: "report", "unexpected media output"),
                        Err(e) => {
                            *model.photo_permission_mut(source) = PermissionState::Unknown;
                            warn!(target: "report", error = %e, "photo permission request failed");
                            Self::show_toast(
                                model,
                                caps,
                                Self::photo_permission_toast(source),
                                ToastKind::Error,
                            );
                            caps.render.render();
                        }
                    }
                }

                Event::ReportPhotoPicked { mount_seq, result } => {
                    if mount_seq != model.report.mount_seq {
                        return;
                    }
                    match *result {
                        Ok(MediaOutput::Image(picked)) => {
                            match photo::prepare_upload_image(&picked.data) {
                                Ok(processed) => {
                                    model.report.photo = Some(StagedPhoto {
                                        file_name: picked.file_name(),
                                        uri: picked.uri,
                                        data: processed.data,
                                        width: processed.width,
                                        height: processed.height,
                                    });
                                    caps.render.render();
                                }
                                Err(e) => {
                                    warn!(target: "report", error = %e, "picked image rejected");
                                    Self::show_toast(
                                        model,
                                        caps,
                                        "Could not process the selected image.",
                                        ToastKind::Error,
                                    );
                                    caps.render.render();
                                }
                            }
                        }
                        Ok(MediaOutput::Cancelled) => {}
                        Ok(MediaOutput::Permission { .. }) => {
                            warn!(target: "report", "unexpected media output");
                        }
                        Err(e) => warn!(target: "report", error = %e, "image pick failed"),
                    }
                }

                Event::ReportSubmitted => {
                    if model.report.is_submitting {
                        return;
                    }
                    if model.report.description.trim().is_empty() {
                        Self::show_toast(
                            model,
                            caps,
                            "Description cannot be empty.",
                            ToastKind::Error,
                        );
                        caps.render.render();
                        return;
                    }
                    model.report.is_submitting = true;
                    model.location_permission = PermissionState::Requesting;
                    let mount_seq = model.report.mount_seq;
                    caps.location.request_permission(move |result| {
                        Event::ReportPermissionUpdated { mount_seq, result }
                    });
                    caps.render.render();
                }

                Event::ReportPermissionUpdated { mount_seq, result } => {
                    if mount_seq != model.report.mount_seq {
                        return;
                    }
                    match result {
                        Ok(LocationOutput::Permission { granted: true }) => {
                            model.location_permission = PermissionState::Granted;
                            caps.location.get_position(move |result| {
                                Event::ReportPositionUpdated { mount_seq, result }
                            });
                        }
                        Ok(LocationOutput::Permission { granted: false }) => {
                            model.location_permission = PermissionState::Denied;
                            warn!(target: "report", "location permission not granted");
                            model.report.is_submitting = false;
                            Self::show_toast(
                                model,
                                caps,
                                "Location permission is needed.",
                                ToastKind::Error,
                            );
                            caps.render.render();
                        }
                        Ok(_) => {
                            warn!(target: "report", "unexpected location output");
                            model.report.is_submitting = false;
                            Self::show_toast(
                                model,
                                caps,
                                "Location permission is needed.",
                                ToastKind::Error,
                            );
                            caps.render.render();
                        }
                        Err(e) => {
                            model.location_permission = PermissionState::Unknown;
                            warn!(target: "report", error = %e, "permission request failed");
                            model.report.is_submitting = false;
                            Self::show_toast(
                                model,
                                caps,
                                "Location permission is needed.",
                                ToastKind::Error,
                            );
                            caps.render.render();
                        }
                    }
                }

                Event::ReportPositionUpdated { mount_seq, result } => {
                    if mount_seq != model.report.mount_seq {
                        return;
                    }
                    match result {
                        Ok(LocationOutput::Position(position)) if position.is_valid() => {
                            Self::submit_report(model, caps, position);
                        }
                        Ok(LocationOutput::Position(position)) => {
                            error!(
                                target: "report",
                                lat = position.latitude,
                                lng = position.longitude,
                                "implausible position"
                            );
                            model.report.is_submitting = false;
                            Self::show_toast(
                                model,
                                caps,
                                "Could not get current location.",
                                ToastKind::Error,
                            );
                            caps.render.render();
                        }
                        Ok(_) => {
                            warn!(target: "report", "unexpected location output");
                            model.report.is_submitting = false;
                            Self::show_toast(
                                model,
                                caps,
                                "Could not get current location.",
                                ToastKind::Error,
                            );
                            caps.render.render();
                        }
                        Err(e) => {
                            error!(target: "report", error = %e, "position lookup failed");
                            model.report.is_submitting = false;
                            Self::show_toast(
                                model,
                                caps,
                                "Could not get current location.",
                                ToastKind::Error,
                            );
                            caps.render.render();
                        }
                    }
                }

                Event::ReportSubmissionCompleted { mount_seq, result } => {
                    if mount_seq != model.report.mount_seq {
                        return;
                    }
                    model.report.is_submitting = false;
                    match *result {
                        Ok(response) if response.is_success() => {
                            model.report.description.clear();
                            model.report.category = IncidentCategory::default();
                            model.report.photo = None;
                            Self::show_toast(
                                model,
                                caps,
                                "Report submitted successfully!",
                                ToastKind::Success,
                            );
                        }
                        Ok(response) => {
                            warn!(
                                target: "report",
                                status = response.status(),
                                "submission rejected"
                            );
                            Self::show_toast(
                                model,
                                caps,
                                "Submission failed. Try again.",
                                ToastKind::Error,
                            );
                        }
                        Err(e) => {
                            warn!(target: "report", error = %e, "submission failed");
                            Self::show_toast(
                                model,
                                caps,
                                "Network error. Please retry.",
                                ToastKind::Error,
                            );
                        }
                    }
                    caps.render.render();
                }
            }
        }

        fn view(&self, model: &Model) -> ViewModel {
            ViewModel {
                header: HeaderView {
                    title: model.active_tab.label().to_string(),
                    epoch: model.header_epoch,
                    fade_in_ms: HEADER_TRANSITION_MS,
                    slide_from_y: HEADER_SLIDE_FROM_Y,
                },
                tab_bar: TabRoute::all()
                    .iter()
                    .map(|route| TabItemView {
                        path: route.path().to_string(),
                        label: route.label().to_string(),
                        icon: route.icon().to_string(),
                        icon_active: route.icon_active().to_string(),
                        active: *route == model.active_tab,
                    })
                    .collect(),
                screen: match model.active_tab {
                    TabRoute::Feed => ScreenView::Feed(Self::build_feed_view(model)),
                    TabRoute::Map => ScreenView::Map(Self::build_map_view(model)),
                    TabRoute::Report => ScreenView::Report(Self::build_report_view(model)),
                },
                toast: model.toast.as_ref().map(|toast| ToastView {
                    message: toast.message.clone(),
                    kind: toast.kind,
                    fade_ms: TOAST_FADE_MS,
                    hold_ms: toast.kind.hold_ms(),
                }),
            }
        }
    }
}

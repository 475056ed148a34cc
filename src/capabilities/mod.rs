mod http;
mod location;
mod media;
mod timer;

pub use self::http::{
    Http, HttpError, HttpHeaders, HttpMethod, HttpOperation, HttpRequest, HttpResponse,
    HttpResult, MultipartForm, RequestBuilder, ValidatedUrl,
};
pub use self::location::{
    Location, LocationError, LocationOperation, LocationOutput, LocationResult, Position,
};
pub use self::media::{
    MediaError, MediaOperation, MediaOutput, MediaPicker, MediaResult, PhotoSource, PickConfig,
    PickedImage,
};
pub use self::timer::{Timer, TimerId, TimerOperation, TimerOutcome};

pub use crux_core::render::Render;

use crate::{App, Event};

#[derive(crux_core::macros::Effect)]
pub struct Capabilities {
    pub render: Render<Event>,
    pub http: Http<Event>,
    pub location: Location<Event>,
    pub media: MediaPicker<Event>,
    pub timer: Timer<Event>,
}

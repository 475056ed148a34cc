use civicwatch_core::{
    App, Effect, Event, HttpOperation, HttpResponse, LocationOutput, Model, Position, ScreenView,
    TabRoute, TimerOperation, TimerOutcome, MAP_API_BASE,
};
use crux_core::testing::AppTester;

fn groups_body(groups: &serde_json::Value) -> Vec<u8> {
    serde_json::to_vec(groups).expect("encode fixture")
}

/// Navigates to the map tab and pumps permission -> position -> fetch,
/// resolving the fetch with the given groups payload.
fn mount_map(app: &AppTester<App, Effect>, model: &mut Model, groups: &serde_json::Value) {
    let update = app.update(Event::TabSelected(TabRoute::Map), model);
    let mut permission_request = update
        .effects
        .into_iter()
        .find_map(|e| match e {
            Effect::Location(request) => Some(request),
            _ => None,
        })
        .expect("map mount should ask for location permission");

    let update = app
        .resolve(
            &mut permission_request,
            Ok(LocationOutput::Permission { granted: true }),
        )
        .expect("resolve permission");
    let event = update.events.into_iter().next().expect("permission event");
    let update = app.update(event, model);

    let mut position_request = update
        .effects
        .into_iter()
        .find_map(|e| match e {
            Effect::Location(request) => Some(request),
            _ => None,
        })
        .expect("position request");
    let update = app
        .resolve(
            &mut position_request,
            Ok(LocationOutput::Position(Position::new(12.97, 77.59))),
        )
        .expect("resolve position");
    let event = update.events.into_iter().next().expect("position event");
    let update = app.update(event, model);

    let mut fetch_request = update
        .effects
        .into_iter()
        .find_map(|e| match e {
            Effect::Http(request) => Some(request),
            _ => None,
        })
        .expect("initial events fetch");
    let update = app
        .resolve(
            &mut fetch_request,
            Ok(HttpResponse::new(200).with_body(groups_body(groups))),
        )
        .expect("resolve fetch");
    let event = update.events.into_iter().next().expect("fetch event");
    app.update(event, model);
}

/// Fires the debounce for a region change and returns the resulting fetch.
fn debounced_fetch(
    app: &AppTester<App, Effect>,
    model: &mut Model,
    latitude: f64,
    longitude: f64,
) -> crux_core::Request<HttpOperation> {
    let update = app.update(
        Event::MapRegionChanged {
            latitude,
            longitude,
        },
        model,
    );
    let mut timer_request = update
        .effects
        .into_iter()
        .find_map(|e| match e {
            Effect::Timer(request) => Some(request),
            _ => None,
        })
        .expect("region change should arm the debounce");

    let update = app
        .resolve(&mut timer_request, TimerOutcome::Fired)
        .expect("resolve debounce");
    let event = update.events.into_iter().next().expect("debounce event");
    let update = app.update(event, model);

    update
        .effects
        .into_iter()
        .find_map(|e| match e {
            Effect::Http(request) => Some(request),
            _ => None,
        })
        .expect("debounce should trigger a fetch")
}

#[test]
fn map_mount_centers_region_and_plots_events() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    let update = app.update(Event::TabSelected(TabRoute::Map), &mut model);
    assert_eq!(model.active_tab, TabRoute::Map);

    let mut permission_request = update
        .effects
        .into_iter()
        .find_map(|e| match e {
            Effect::Location(request) => Some(request),
            _ => None,
        })
        .expect("permission request");
    let update = app
        .resolve(
            &mut permission_request,
            Ok(LocationOutput::Permission { granted: true }),
        )
        .expect("resolve permission");
    let event = update.events.into_iter().next().expect("permission event");
    let update = app.update(event, &mut model);

    let mut position_request = update
        .effects
        .into_iter()
        .find_map(|e| match e {
            Effect::Location(request) => Some(request),
            _ => None,
        })
        .expect("position request");
    let update = app
        .resolve(
            &mut position_request,
            Ok(LocationOutput::Position(Position::new(12.97, 77.59))),
        )
        .expect("resolve position");
    let event = update.events.into_iter().next().expect("position event");
    let update = app.update(event, &mut model);

    // 1. Region centers on the fix; deltas follow the screen aspect ratio
    let region = model.map.region.expect("region after position");
    assert!((region.latitude - 12.97).abs() < 1e-9);
    assert!((region.longitude - 77.59).abs() < 1e-9);
    assert!((region.latitude_delta - 0.05).abs() < 1e-9);
    assert!((region.longitude_delta - 0.05 * (375.0 / 812.0)).abs() < 1e-9);

    // 2. The fetch goes straight out, no debounce on first load
    let mut fetch_request = update
        .effects
        .into_iter()
        .find_map(|e| match e {
            Effect::Http(request) => Some(request),
            _ => None,
        })
        .expect("initial fetch");
    let HttpOperation::Execute(http) = &fetch_request.operation;
    assert_eq!(
        http.url.as_str(),
        format!("{MAP_API_BASE}/events-nearby?latitude=12.97&longitude=77.59")
    );

    // 3. Events without both coordinates are not plotted
    let groups = serde_json::json!([
        {
            "event_type": "music",
            "events": [
                {"lat": 12.96, "lng": 77.58, "title": "Street concert", "location": "Park", "datetime": "2026-08-21", "link": "https://events.example/1"},
                {"lat": 12.95, "title": "No longitude"}
            ]
        },
        {
            "type": "food",
            "events": [{"lat": 12.94, "lng": 77.57, "title": "Night market"}]
        }
    ]);
    let update = app
        .resolve(
            &mut fetch_request,
            Ok(HttpResponse::new(200).with_body(groups_body(&groups))),
        )
        .expect("resolve fetch");
    let event = update.events.into_iter().next().expect("fetch event");
    app.update(event, &mut model);

    assert_eq!(model.map.annotations.len(), 2);
    assert_eq!(model.map.all_categories, vec!["music", "food"]);
    assert_eq!(model.map.selected_categories, vec!["music", "food"]);

    let view = app.view(&model);
    let ScreenView::Map(map) = view.screen else {
        panic!("map tab should project the map screen");
    };
    assert_eq!(map.markers.len(), 2);
    assert_eq!(map.markers[0].icon, "music");
    assert_eq!(map.markers[0].callout_action, "View Details");
    assert_eq!(map.filters.len(), 2);
    assert!(map.filters.iter().all(|f| f.selected));
}

#[test]
fn region_changes_coalesce_into_one_fetch_with_latest_coordinates() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    mount_map(&app, &mut model, &serde_json::json!([]));

    // 1. Before the shell reports the map ready, pans are ignored
    let update = app.update(
        Event::MapRegionChanged {
            latitude: 12.80,
            longitude: 77.40,
        },
        &mut model,
    );
    assert!(
        !update.effects.iter().any(|e| matches!(e, Effect::Timer(_))),
        "no debounce before the map is ready"
    );

    app.update(Event::MapReady, &mut model);

    // 2. First pan arms a 1s debounce
    let update = app.update(
        Event::MapRegionChanged {
            latitude: 12.80,
            longitude: 77.40,
        },
        &mut model,
    );
    let mut first_timer = update
        .effects
        .into_iter()
        .find_map(|e| match e {
            Effect::Timer(request) => Some(request),
            _ => None,
        })
        .expect("debounce start");
    let TimerOperation::Start {
        id: first_id,
        duration_ms,
    } = first_timer.operation
    else {
        panic!("expected a timer start");
    };
    assert_eq!(duration_ms, 1000);

    // 3. A second pan half a second later cancels the first and re-arms
    let update = app.update(
        Event::MapRegionChanged {
            latitude: 12.81,
            longitude: 77.41,
        },
        &mut model,
    );
    let mut cancel_seen = false;
    let mut second_timer = None;
    for effect in update.effects {
        if let Effect::Timer(request) = effect {
            match request.operation {
                TimerOperation::Cancel { id } => {
                    assert_eq!(id, first_id);
                    cancel_seen = true;
                }
                TimerOperation::Start { .. } => second_timer = Some(request),
            }
        }
    }
    assert!(cancel_seen, "superseded debounce must be cancelled");
    let mut second_timer = second_timer.expect("replacement debounce");

    // 4. The cancelled timer resolving is a no-op
    let update = app
        .resolve(&mut first_timer, TimerOutcome::Cancelled)
        .expect("resolve cancelled timer");
    let event = update.events.into_iter().next().expect("timer event");
    let update = app.update(event, &mut model);
    assert!(
        !update.effects.iter().any(|e| matches!(e, Effect::Http(_))),
        "cancelled debounce must not fetch"
    );

    // 5. The live timer firing fetches with the latest coordinates
    let update = app
        .resolve(&mut second_timer, TimerOutcome::Fired)
        .expect("resolve debounce");
    let event = update.events.into_iter().next().expect("timer event");
    let update = app.update(event, &mut model);

    let fetch = update
        .effects
        .into_iter()
        .find_map(|e| match e {
            Effect::Http(request) => Some(request),
            _ => None,
        })
        .expect("debounced fetch");
    let HttpOperation::Execute(http) = &fetch.operation;
    assert_eq!(
        http.url.as_str(),
        format!("{MAP_API_BASE}/events-nearby?latitude=12.81&longitude=77.41")
    );
}

#[test]
fn repeated_coordinates_are_plotted_once_and_selection_is_stable() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    let first_batch = serde_json::json!([
        {"event_type": "music", "events": [{"lat": 1.0, "lng": 2.0, "title": "A"}]},
        {"event_type": "tech", "events": [{"lat": 3.0, "lng": 4.0, "title": "B"}]}
    ]);
    mount_map(&app, &mut model, &first_batch);
    assert_eq!(model.map.selected_categories, vec!["music", "tech"]);

    // Narrow the selection before more data arrives
    app.update(
        Event::MapCategoryToggled {
            category: "tech".to_string(),
        },
        &mut model,
    );
    assert_eq!(model.map.selected_categories, vec!["music"]);

    app.update(Event::MapReady, &mut model);
    let mut fetch = debounced_fetch(&app, &mut model, 1.5, 2.5);

    // Second batch repeats (3,4) and introduces a new category
    let second_batch = serde_json::json!([
        {"event_type": "tech", "events": [{"lat": 3.0, "lng": 4.0, "title": "B again"}]},
        {"event_type": "food", "events": [{"lat": 5.0, "lng": 6.0, "title": "C"}]}
    ]);
    let update = app
        .resolve(
            &mut fetch,
            Ok(HttpResponse::new(200).with_body(groups_body(&second_batch))),
        )
        .expect("resolve fetch");
    let event = update.events.into_iter().next().expect("fetch event");
    app.update(event, &mut model);

    // 1. The repeated coordinate did not duplicate its pin
    assert_eq!(model.map.annotations.len(), 3);
    // 2. Known categories grew, the user's narrowed selection did not
    assert_eq!(model.map.all_categories, vec!["music", "tech", "food"]);
    assert_eq!(model.map.selected_categories, vec!["music"]);

    let view = app.view(&model);
    let ScreenView::Map(map) = view.screen else {
        panic!("expected map screen");
    };
    assert_eq!(map.markers.len(), 1, "only selected categories are plotted");
    assert_eq!(map.filters.len(), 3);

    // 3. Re-selecting brings the pins back
    app.update(
        Event::MapCategoryToggled {
            category: "food".to_string(),
        },
        &mut model,
    );
    let view = app.view(&model);
    let ScreenView::Map(map) = view.screen else {
        panic!("expected map screen");
    };
    assert_eq!(map.markers.len(), 2);
}

#[test]
fn denied_location_shows_alert_and_blocks_region_fetches() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    let update = app.update(Event::TabSelected(TabRoute::Map), &mut model);
    let mut permission_request = update
        .effects
        .into_iter()
        .find_map(|e| match e {
            Effect::Location(request) => Some(request),
            _ => None,
        })
        .expect("permission request");
    let update = app
        .resolve(
            &mut permission_request,
            Ok(LocationOutput::Permission { granted: false }),
        )
        .expect("resolve permission");
    let event = update.events.into_iter().next().expect("permission event");
    app.update(event, &mut model);

    let alert = model.map.alert.clone().expect("denial alert");
    assert_eq!(alert.title, "Permission denied");
    assert_eq!(alert.message, "Location access is required.");

    // Pans go nowhere while the alert is up, even once the map is ready
    app.update(Event::MapReady, &mut model);
    let update = app.update(
        Event::MapRegionChanged {
            latitude: 12.80,
            longitude: 77.40,
        },
        &mut model,
    );
    assert!(!update.effects.iter().any(|e| matches!(e, Effect::Timer(_))));

    // Dismissing the alert unblocks them
    app.update(Event::MapAlertDismissed, &mut model);
    assert!(model.map.alert.is_none());
    let update = app.update(
        Event::MapRegionChanged {
            latitude: 12.80,
            longitude: 77.40,
        },
        &mut model,
    );
    assert!(update.effects.iter().any(|e| matches!(e, Effect::Timer(_))));
}

#[test]
fn leaving_the_map_cancels_the_debounce_and_remount_starts_clean() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    let batch = serde_json::json!([
        {"event_type": "music", "events": [{"lat": 1.0, "lng": 2.0, "title": "A"}]}
    ]);
    mount_map(&app, &mut model, &batch);
    assert_eq!(model.map.annotations.len(), 1);

    app.update(Event::MapReady, &mut model);

    // Arm a debounce, then navigate away before it fires
    let update = app.update(
        Event::MapRegionChanged {
            latitude: 2.0,
            longitude: 3.0,
        },
        &mut model,
    );
    assert!(update.effects.iter().any(|e| matches!(e, Effect::Timer(_))));

    let update = app.update(Event::TabSelected(TabRoute::Feed), &mut model);
    let cancelled = update.effects.iter().any(|e| {
        matches!(
            e,
            Effect::Timer(request) if matches!(request.operation, TimerOperation::Cancel { .. })
        )
    });
    assert!(cancelled, "leaving the map must cancel the pending debounce");
    assert!(model.map.pending_fetch.is_none());

    // Coming back starts from scratch
    let update = app.update(Event::TabSelected(TabRoute::Map), &mut model);
    assert!(model.map.annotations.is_empty());
    assert!(!model.map.map_ready);
    assert!(
        update.effects.iter().any(|e| matches!(e, Effect::Location(_))),
        "remount re-requests permission"
    );
}

#[test]
fn stale_events_response_after_remount_is_dropped() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    mount_map(&app, &mut model, &serde_json::json!([]));
    app.update(Event::MapReady, &mut model);

    // A fetch goes out, then the user leaves and returns before it lands
    let mut stale_fetch = debounced_fetch(&app, &mut model, 9.0, 9.0);
    app.update(Event::TabSelected(TabRoute::Feed), &mut model);
    app.update(Event::TabSelected(TabRoute::Map), &mut model);

    let batch = serde_json::json!([
        {"event_type": "music", "events": [{"lat": 1.0, "lng": 2.0, "title": "A"}]}
    ]);
    let update = app
        .resolve(
            &mut stale_fetch,
            Ok(HttpResponse::new(200).with_body(groups_body(&batch))),
        )
        .expect("resolve stale fetch");
    let event = update.events.into_iter().next().expect("fetch event");
    app.update(event, &mut model);

    assert!(
        model.map.annotations.is_empty(),
        "events for a retired mount must be ignored"
    );
}

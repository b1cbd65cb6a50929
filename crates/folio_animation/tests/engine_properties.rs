//! End-to-end behaviour of the animation engine
//!
//! These tests drive a clock frame by frame the way a host would and check
//! the guarantees pages rely on:
//! - progress only moves forward while a tween plays forward
//! - reverting a scope is final and idempotent
//! - staggers space targets in input order
//! - a reversed timeline restores the starting values
//! - one-shot, toggle and scrubbed scroll bindings
//! - the bootstrap sequence signals completion exactly once
//! - tweens over empty queries complete instead of failing

use folio_animation::{
    stagger, AnimationClock, AnimationEvent, AnimationState, Bootstrap, BootstrapPhase,
    BootstrapTargets, MotionPreference, Position, Scope, ScrollCondition, ScrollMode,
    ScrollTrigger, Stagger, Timeline, TimelineChild, ToggleActions, Tween,
};
use folio_core::{Node, NodeTree, Rect, Target, TargetRef, Targets, Value};
use std::cell::RefCell;
use std::rc::Rc;

const FRAME: f64 = 1.0 / 64.0;

fn node(id: &str) -> (Rc<RefCell<Node>>, TargetRef) {
    let node = Rc::new(RefCell::new(Node::new(id)));
    let target: TargetRef = node.clone();
    (node, target)
}

fn run_for(clock: &AnimationClock, seconds: f64) {
    let frames = (seconds / FRAME).ceil() as usize;
    for _ in 0..frames {
        clock.tick(FRAME);
    }
}

fn number(node: &Rc<RefCell<Node>>, property: &str) -> f32 {
    node.borrow().number(property).unwrap_or(f32::NAN)
}

#[test]
fn test_fraction_is_monotonic_and_bounded() {
    let (_node, target) = node("box");
    let clock = AnimationClock::new();
    let handle = clock.handle();

    let samples = Rc::new(RefCell::new(Vec::new()));
    let sink = samples.clone();
    let tween = Tween::build(&target)
        .to("x", Value::px(300.0))
        .duration(1.3)
        .ease_named("back.out(1.7)")
        .on_update(move |fraction| sink.borrow_mut().push(fraction))
        .finish()
        .unwrap();
    let id = handle.add(tween);

    // Irregular frame pacing
    let mut now = 0.0;
    for step in 0..200 {
        now += if step % 3 == 0 { 0.031 } else { 0.007 };
        clock.advance(now);
    }

    let samples = samples.borrow();
    assert!(samples.len() > 10);
    assert!(samples.windows(2).all(|pair| pair[0] <= pair[1]));
    assert!(samples.iter().all(|f| (0.0..=1.0).contains(f)));
    assert_eq!(samples.last().copied(), Some(1.0));
    assert!(handle.is_complete(id));
}

#[test]
fn test_scope_revert_is_final_and_idempotent() {
    let mut tree = NodeTree::new();
    let card = tree.insert(Node::new("card").class("card").at(Rect::new(0.0, 900.0, 300.0, 200.0)));
    let clock = AnimationClock::new();
    let handle = clock.handle();

    let scope = Scope::named(&handle, "projects");
    let mut timeline = Timeline::new();
    timeline.add(
        Tween::build(Targets::query(&tree, ".card"))
            .from_to("opacity", 0.0, 1.0)
            .duration(1.0)
            .finish()
            .unwrap(),
        Position::Absolute(0.0),
    );
    let id = scope.add(timeline);
    let trigger: TargetRef = card.clone();
    let binding = scope
        .attach_scroll(id, ScrollTrigger::new(&trigger, ScrollMode::Scrub))
        .unwrap();

    handle.scroll_to(400.0);
    clock.tick(FRAME);
    let writes = card.borrow().write_count();
    assert!(writes > 0);

    scope.revert();
    let events_after_first = handle.drain_events();
    scope.revert();
    assert!(handle.drain_events().is_empty());
    assert!(events_after_first.contains(&AnimationEvent::Killed(id)));

    assert!(!handle.has_binding(binding));
    assert_eq!(handle.state(id), AnimationState::Killed);

    handle.scroll_to(800.0);
    handle.play(id);
    handle.set_progress(id, 1.0);
    run_for(&clock, 2.0);
    assert_eq!(card.borrow().write_count(), writes);
}

#[test]
fn test_stagger_delays_follow_input_order() {
    let mut tree = NodeTree::new();
    for id in ["a", "b", "c"] {
        tree.insert(Node::new(id).class("skill-item"));
    }
    let base = Tween::build(Targets::query(&tree, ".skill-item"))
        .from_to("opacity", 0.0, 1.0)
        .duration(0.5)
        .finish()
        .unwrap();
    let group = stagger(base, &Stagger::new(0.1));

    let delays: Vec<f64> = group
        .children()
        .filter_map(|child| match child {
            TimelineChild::Animation(animation) => animation.as_tween().map(Tween::delay),
            TimelineChild::Call(_) => None,
        })
        .collect();
    assert_eq!(delays, vec![0.0, 0.1, 0.2]);

    // Writes follow the same order within a frame
    let clock = AnimationClock::new();
    let handle = clock.handle();
    handle.add(group);
    run_for(&clock, 0.12);
    let a = number(&tree.get("a").unwrap(), "opacity");
    let b = number(&tree.get("b").unwrap(), "opacity");
    let c = number(&tree.get("c").unwrap(), "opacity");
    assert!(a > b && b > 0.0);
    assert_eq!(c, 0.0);
}

#[test]
fn test_reversed_timeline_restores_start_values() {
    let (hero, target) = node("hero");
    hero.borrow_mut().set("x", Value::px(0.0));
    hero.borrow_mut().set("color", "#000000".parse().unwrap());

    let clock = AnimationClock::new();
    let handle = clock.handle();

    let mut timeline = Timeline::new();
    timeline.then(Tween::build(&target).to("x", Value::px(100.0)).duration(0.5).finish().unwrap());
    timeline.then(Tween::build(&target).to("x", Value::px(250.0)).duration(0.5).finish().unwrap());
    timeline
        .add_at(
            Tween::build(&target)
                .to("scale", 1.5)
                .to("color", "#ff8800".parse::<Value>().unwrap())
                .duration(0.75)
                .finish()
                .unwrap(),
            "<-0.25",
        )
        .unwrap();
    let id = handle.add(timeline);

    run_for(&clock, 1.5);
    assert!(handle.is_complete(id));
    assert_eq!(hero.borrow().get("x"), Some(Value::px(250.0)));
    assert!((number(&hero, "scale") - 1.5).abs() < 1e-5);

    handle.reverse(id);
    run_for(&clock, 1.5);
    assert_eq!(handle.time(id), Some(0.0));
    let hero = hero.borrow();
    assert!(hero.get("x").unwrap().approx_eq(&Value::px(0.0), 1e-4));
    assert!((hero.number("scale").unwrap() - 1.0).abs() < 1e-5);
    assert!(hero
        .get("color")
        .unwrap()
        .approx_eq(&"#000000".parse().unwrap(), 1e-5));
    assert!(handle
        .drain_events()
        .contains(&AnimationEvent::ReverseCompleted(id)));
}

#[test]
fn test_toggle_binding_plays_and_reverses() {
    let (section, target) = node("about");
    section.borrow_mut().set_bounds(Rect::new(0.0, 1000.0, 1280.0, 200.0));

    let clock = AnimationClock::new();
    let handle = clock.handle();

    let mut timeline = Timeline::new();
    timeline.then(
        Tween::build(&target)
            .from_to("opacity", 0.0, 1.0)
            .from_to("y", Value::px(50.0), Value::px(0.0))
            .duration(1.0)
            .finish()
            .unwrap(),
    );
    let id = handle.add(timeline);
    let trigger = ScrollTrigger::new(&target, ScrollMode::Toggle(ToggleActions::PlayReverse))
        .range("top 80%", "bottom 20%")
        .unwrap();
    handle.attach_scroll(id, trigger).unwrap();

    // Start sits at 1000 - 0.8 * 720 = 424px
    run_for(&clock, 0.5);
    assert_eq!(number(&section, "opacity"), 0.0);

    handle.scroll_to(500.0);
    run_for(&clock, 1.5);
    assert!(handle.is_complete(id));
    assert_eq!(number(&section, "opacity"), 1.0);

    handle.scroll_to(100.0);
    run_for(&clock, 1.5);
    assert!(handle.is_reversed(id));
    assert_eq!(number(&section, "opacity"), 0.0);
    assert_eq!(section.borrow().get("y"), Some(Value::px(50.0)));
}

#[test]
fn test_one_shot_binding_plays_once_until_reset() {
    let (card, target) = node("card");
    card.borrow_mut().set_bounds(Rect::new(0.0, 1000.0, 1280.0, 200.0));

    let clock = AnimationClock::new();
    let handle = clock.handle();
    let id = handle.add(
        Tween::build(&target)
            .from_to("opacity", 0.0, 1.0)
            .duration(1.0)
            .finish()
            .unwrap(),
    );
    let trigger = ScrollTrigger::new(&target, ScrollMode::OneShot)
        .range("top 80%", "bottom 20%")
        .unwrap();
    let binding = handle.attach_scroll(id, trigger).unwrap();

    run_for(&clock, 0.5);
    assert_eq!(handle.state(id), AnimationState::Pending);
    assert_eq!(number(&card, "opacity"), 0.0);

    // Start sits at 1000 - 0.8 * 720 = 424px
    handle.scroll_to(500.0);
    run_for(&clock, 1.5);
    assert!(handle.is_complete(id));
    assert_eq!(number(&card, "opacity"), 1.0);

    // Bouncing across the start never replays or reverses
    for y in [100.0, 600.0, 0.0, 800.0] {
        handle.scroll_to(y);
        run_for(&clock, 0.5);
        assert!(handle.is_complete(id));
        assert!(!handle.is_reversed(id));
        assert_eq!(number(&card, "opacity"), 1.0);
    }
    let started = handle
        .drain_events()
        .iter()
        .filter(|event| **event == AnimationEvent::Started(id))
        .count();
    assert_eq!(started, 1);

    // A reset re-arms the binding; the next crossing plays from the start
    handle.seek(id, 0.0);
    assert_eq!(number(&card, "opacity"), 0.0);
    handle.scroll_to(0.0);
    run_for(&clock, 0.25);
    handle.reset_binding(binding);
    assert!(handle.has_binding(binding));
    run_for(&clock, 0.5);
    assert_eq!(number(&card, "opacity"), 0.0);

    handle.scroll_to(500.0);
    run_for(&clock, 0.5);
    let midway = number(&card, "opacity");
    assert!(midway > 0.0 && midway < 1.0, "opacity {midway}");
    run_for(&clock, 1.0);
    assert!(handle.is_complete(id));
    assert_eq!(number(&card, "opacity"), 1.0);
}

#[test]
fn test_scrub_maps_scroll_to_progress() {
    let (page, target) = node("page");
    page.borrow_mut().set_bounds(Rect::new(0.0, 0.0, 1280.0, 4000.0));

    let clock = AnimationClock::new();
    let handle = clock.handle();
    let id = handle.add(
        Tween::build(&target)
            .to("yPercent", Value::percent(-50.0))
            .duration(1.0)
            .ease_named("none")
            .finish()
            .unwrap(),
    );
    let trigger = ScrollTrigger::new(&target, ScrollMode::Scrub)
        .start(ScrollCondition::Absolute(0.0))
        .end(ScrollCondition::Absolute(1000.0));
    handle.attach_scroll(id, trigger).unwrap();

    handle.scroll_to(500.0);
    clock.tick(FRAME);
    assert_eq!(handle.progress(id), 0.5);
    assert_eq!(page.borrow().get("yPercent"), Some(Value::percent(-25.0)));

    // Many scroll events inside one frame collapse into one recompute
    for y in [600.0, 900.0, 2000.0, 250.0] {
        handle.scroll_to(y);
    }
    clock.tick(FRAME);
    assert_eq!(handle.progress(id), 0.25);

    // Time does not move a scrubbed animation
    run_for(&clock, 3.0);
    assert_eq!(handle.progress(id), 0.25);
}

#[test]
fn test_bootstrap_completes_exactly_once() {
    let mut tree = NodeTree::new();
    for (id, class) in [
        ("preloader", "preloader"),
        ("logo", "loading-logo"),
        ("caption", "loading-text"),
        ("bar", "progress-bar"),
    ] {
        tree.insert(Node::new(id).class(class));
    }

    let clock = AnimationClock::new();
    let handle = clock.handle();
    let bootstrap = Bootstrap::start(
        &handle,
        &BootstrapTargets::query(&tree),
        &Default::default(),
    )
    .unwrap();

    let done = bootstrap.done();
    let notified = Rc::new(RefCell::new(0));
    let counter = notified.clone();
    done.subscribe(move || *counter.borrow_mut() += 1);

    run_for(&clock, 3.0);
    assert_eq!(bootstrap.progress(), 100.0);
    assert_eq!(bootstrap.phase(), BootstrapPhase::Running);

    run_for(&clock, 0.5);
    assert_eq!(bootstrap.phase(), BootstrapPhase::ExitAnimating);
    assert_eq!(bootstrap.full_writes_before_exit(), Some(1));

    run_for(&clock, 10.0);
    assert_eq!(bootstrap.phase(), BootstrapPhase::Done);
    assert_eq!(done.emit_count(), 1);
    assert_eq!(*notified.borrow(), 1);
    assert_eq!(bootstrap.progress_cell().borrow().full_writes(), 1);

    let preloader = tree.get("preloader").unwrap();
    assert_eq!(number(&preloader, "opacity"), 0.0);
    assert_eq!(number(&tree.get("bar").unwrap(), "scaleX"), 0.0);
}

#[test]
fn test_bootstrap_under_reduced_motion_still_gates() {
    let clock = AnimationClock::new();
    let handle = clock.handle();
    handle.set_motion_preference(MotionPreference::Reduced);

    let bootstrap =
        Bootstrap::start(&handle, &BootstrapTargets::default(), &Default::default()).unwrap();

    run_for(&clock, 2.0);
    assert!(bootstrap.progress() > 0.0 && bootstrap.progress() < 100.0);
    run_for(&clock, 2.0);
    assert!(bootstrap.is_done());
    assert_eq!(bootstrap.done().emit_count(), 1);
}

#[test]
fn test_empty_query_completes_next_frame() {
    let tree = NodeTree::new();
    let clock = AnimationClock::new();
    let handle = clock.handle();

    let tween = Tween::build(Targets::query(&tree, ".missing"))
        .to("opacity", 1.0)
        .duration(2.0)
        .delay(1.0)
        .finish()
        .unwrap();
    let id = handle.add(tween);
    assert!(!handle.is_complete(id));

    clock.tick(FRAME);
    assert!(handle.is_complete(id));
    assert!(handle.completion(id).is_set());
}

//! Section animations
//!
//! Every section mounts into its own [`Scope`]; unmounting reverts it. The
//! scroll-driven entrances are written as [`AnimationRequest`]s, the same
//! option bags a page script would pass, and resolved against the page.

use crate::page::{PortfolioPage, SectionKind};
use crate::rng::Rng64;
use folio_animation::{
    stagger, AnimationId, AnimationPreset, AnimationRequest, ClockHandle, Easing, EndpointOption,
    Position, Result, Scope, ScrollMode, ScrollTrigger, ScrollTriggerOptions, Stagger, Timeline,
    ToggleActions, Tween, TweenOptions,
};
use folio_core::{Target, TargetResolver, Targets, Value};
use std::collections::BTreeMap;

/// Mount one section and return the scope that owns its animations
pub fn mount(
    kind: SectionKind,
    clock: &ClockHandle,
    page: &PortfolioPage,
    rng: &mut Rng64,
) -> Result<Scope> {
    let scope = Scope::named(clock, kind.as_str());
    match kind {
        SectionKind::Navigation => mount_navigation(&scope, page)?,
        SectionKind::Orbs => mount_orbs(&scope, page, rng)?,
        SectionKind::Hero => mount_hero(&scope, page)?,
        SectionKind::About => mount_about(&scope, page)?,
        SectionKind::Projects => mount_projects(&scope, page)?,
        SectionKind::Contact => mount_contact(&scope, page)?,
        SectionKind::Footer => mount_footer(&scope, page)?,
    }
    tracing::debug!(
        section = %kind,
        animations = scope.animations().len(),
        bindings = scope.bindings().len(),
        "section mounted"
    );
    Ok(scope)
}

// ============================================================================
// Request helpers
// ============================================================================

fn props(pairs: &[(&str, EndpointOption)]) -> BTreeMap<String, EndpointOption> {
    pairs
        .iter()
        .map(|(property, endpoint)| (property.to_string(), endpoint.clone()))
        .collect()
}

fn entrance(
    targets: &str,
    from: &[(&str, EndpointOption)],
    to: &[(&str, EndpointOption)],
    options: TweenOptions,
) -> AnimationRequest {
    AnimationRequest {
        targets: targets.to_string(),
        from: props(from),
        to: props(to),
        options,
    }
}

/// Plays once when `trigger` (or the animated element) reaches `start`
fn when_visible(trigger: Option<&str>, start: &str, end: Option<&str>) -> Option<ScrollTriggerOptions> {
    Some(ScrollTriggerOptions {
        trigger: trigger.map(str::to_string),
        start: Some(start.to_string()),
        end: end.map(str::to_string),
        ..Default::default()
    })
}

fn animate(scope: &Scope, page: &PortfolioPage, request: &AnimationRequest) -> Result<AnimationId> {
    scope.run(|| scope.clock().animate(page, request))
}

fn px(value: f32) -> EndpointOption {
    EndpointOption::Text(Value::px(value).to_string())
}

fn num(value: f32) -> EndpointOption {
    EndpointOption::Number(value)
}

// ============================================================================
// Sections
// ============================================================================

fn mount_navigation(scope: &Scope, page: &PortfolioPage) -> Result<()> {
    let nav = AnimationPreset::nav_drop_in(Targets::query(page, ".nav-container"))
        .delay(0.5)
        .finish()?;
    scope.add(nav);
    Ok(())
}

fn mount_hero(scope: &Scope, page: &PortfolioPage) -> Result<()> {
    let headline = Tween::build(Targets::query(page, ".hero-headline"))
        .from_to("opacity", 0.0, 1.0)
        .from_to("y", Value::px(50.0), Value::px(0.0))
        .from_to("blur", Value::px(10.0), Value::px(0.0))
        .duration(1.2)
        .ease(Easing::EaseOutCubic)
        .finish()?;
    let subtitle = AnimationPreset::slide_up(Targets::query(page, ".hero-subtitle"), 30.0, 1.0).finish()?;
    let buttons = AnimationPreset::slide_up(Targets::query(page, ".hero-buttons"), 30.0, 1.0).finish()?;
    let spline = Tween::build(Targets::query(page, ".spline-container"))
        .from_to("opacity", 0.0, 1.0)
        .from_to("x", Value::px(100.0), Value::px(0.0))
        .from_to("scale", 0.8, 1.0)
        .duration(1.5)
        .ease(Easing::EaseOutCubic)
        .finish()?;

    let mut timeline = Timeline::new().with_delay(1.0);
    timeline.then(headline);
    timeline.add_at(subtitle, "-=0.6")?;
    timeline.add_at(buttons, "-=0.4")?;
    timeline.add_at(spline, "-=1")?;
    scope.add(timeline);
    Ok(())
}

fn mount_about(scope: &Scope, page: &PortfolioPage) -> Result<()> {
    let smooth = || Some("power2.out".to_string());

    animate(
        scope,
        page,
        &entrance(
            ".profile-image",
            &[("opacity", num(0.0)), ("x", px(-50.0)), ("scale", num(0.8)), ("blur", px(10.0))],
            &[("opacity", num(1.0)), ("x", px(0.0)), ("scale", num(1.0)), ("blur", px(0.0))],
            TweenOptions {
                duration: Some(1.2),
                easing: smooth(),
                scroll_trigger: when_visible(None, "top 80%", Some("bottom 20%")),
                ..Default::default()
            },
        ),
    )?;

    animate(
        scope,
        page,
        &entrance(
            ".bio-text",
            &[("opacity", num(0.0)), ("y", px(50.0))],
            &[("opacity", num(1.0)), ("y", px(0.0))],
            TweenOptions {
                duration: Some(1.0),
                easing: smooth(),
                scroll_trigger: when_visible(None, "top 80%", None),
                ..Default::default()
            },
        ),
    )?;

    animate(
        scope,
        page,
        &entrance(
            ".skill-item",
            &[("opacity", num(0.0)), ("y", px(30.0)), ("scale", num(0.8))],
            &[("opacity", num(1.0)), ("y", px(0.0)), ("scale", num(1.0))],
            TweenOptions {
                duration: Some(0.6),
                easing: Some("back.out(1.7)".to_string()),
                stagger: Some(0.1),
                scroll_trigger: when_visible(Some(".skills-grid"), "top 80%", None),
                ..Default::default()
            },
        ),
    )?;

    // Each bar fills to its own level, so build the stagger by hand
    let mut bars = Timeline::new();
    for (index, bar) in page.resolve(".skill-progress").iter().enumerate() {
        let level = bar.borrow().get("level").and_then(|v| v.as_f32()).unwrap_or(0.0);
        let fill = AnimationPreset::progress_fill(bar, level).finish()?;
        bars.add(fill, Position::Absolute(index as f64 * 0.1));
    }
    let bars = scope.add(bars);
    if let Some(grid) = page.resolve(".skills-grid").first() {
        let trigger = ScrollTrigger::new(grid, ScrollMode::Toggle(ToggleActions::PlayNone))
            .start("top 60%".parse()?);
        scope.attach_scroll(bars, trigger)?;
    }
    Ok(())
}

fn mount_projects(scope: &Scope, page: &PortfolioPage) -> Result<()> {
    animate(
        scope,
        page,
        &entrance(
            ".projects-title",
            &[("opacity", num(0.0)), ("y", px(50.0))],
            &[("opacity", num(1.0)), ("y", px(0.0))],
            TweenOptions {
                duration: Some(1.0),
                easing: Some("power2.out".to_string()),
                scroll_trigger: when_visible(None, "top 80%", None),
                ..Default::default()
            },
        ),
    )?;

    animate(
        scope,
        page,
        &entrance(
            ".project-card",
            &[("opacity", num(0.0)), ("y", px(50.0)), ("scale", num(0.9)), ("blur", px(10.0))],
            &[("opacity", num(1.0)), ("y", px(0.0)), ("scale", num(1.0)), ("blur", px(0.0))],
            TweenOptions {
                duration: Some(0.8),
                easing: Some("power2.out".to_string()),
                stagger: Some(0.2),
                scroll_trigger: when_visible(Some(".projects-grid"), "top 80%", None),
                ..Default::default()
            },
        ),
    )?;
    Ok(())
}

fn mount_contact(scope: &Scope, page: &PortfolioPage) -> Result<()> {
    let reveal = |targets: &str, from: (&str, f32), start: &str| {
        entrance(
            targets,
            &[("opacity", num(0.0)), (from.0, px(from.1))],
            &[("opacity", num(1.0)), (from.0, px(0.0))],
            TweenOptions {
                duration: Some(1.0),
                easing: Some("power2.out".to_string()),
                scroll_trigger: when_visible(None, start, None),
                ..Default::default()
            },
        )
    };

    animate(scope, page, &reveal(".contact-title", ("y", 50.0), "top 80%"))?;
    animate(scope, page, &reveal(".contact-form", ("x", -50.0), "top 80%"))?;
    animate(scope, page, &reveal(".contact-info", ("x", 50.0), "top 80%"))?;

    animate(
        scope,
        page,
        &entrance(
            ".form-input",
            &[("opacity", num(0.0)), ("y", px(30.0))],
            &[("opacity", num(1.0)), ("y", px(0.0))],
            TweenOptions {
                duration: Some(0.6),
                stagger: Some(0.1),
                scroll_trigger: when_visible(Some(".contact-form"), "top 70%", None),
                ..Default::default()
            },
        ),
    )?;
    Ok(())
}

fn mount_footer(scope: &Scope, page: &PortfolioPage) -> Result<()> {
    animate(
        scope,
        page,
        &entrance(
            ".footer-content",
            &[("opacity", num(0.0)), ("y", px(60.0))],
            &[("opacity", num(1.0)), ("y", px(0.0))],
            TweenOptions {
                duration: Some(1.0),
                easing: Some("power2.out".to_string()),
                scroll_trigger: when_visible(None, "top 90%", None),
                ..Default::default()
            },
        ),
    )?;

    let particles = AnimationPreset::particle(Targets::query(page, ".footer-particle")).finish()?;
    if particles.targets().len() > 1 {
        scope.add(stagger(particles, &Stagger::new(0.5)));
    } else {
        scope.add(particles);
    }
    Ok(())
}

fn mount_orbs(scope: &Scope, page: &PortfolioPage, rng: &mut Rng64) -> Result<()> {
    let viewport = page.viewport();
    for (index, orb) in page.resolve(".floating-orb").iter().enumerate() {
        scope.add(Tween::set(
            orb,
            &[
                ("x", Value::px(rng.range(0.0, viewport.width))),
                ("y", Value::px(rng.range(0.0, viewport.height))),
            ],
        ));

        let drift = AnimationPreset::float_orb(
            orb,
            rng.range(-100.0, 100.0),
            rng.range(-100.0, 100.0),
            f64::from(rng.range(10.0, 20.0)),
        )
        .delay(index as f64 * 0.5)
        .finish()?;
        scope.add(drift);

        let pulse = AnimationPreset::pulse(orb, f64::from(rng.range(3.0, 5.0))).finish()?;
        scope.add(pulse);
    }
    Ok(())
}

// ============================================================================
// Page-wide
// ============================================================================

/// The main shell's entrance once the preloader is gone
pub fn mount_main_content(clock: &ClockHandle, page: &PortfolioPage) -> Result<Scope> {
    let scope = Scope::named(clock, "main-content");
    let shell = AnimationPreset::scale_in(Targets::query(page, ".main-content"), 0.95, 1.5)
        .delay(0.2)
        .finish()?;
    scope.add(shell);
    Ok(scope)
}

/// `.reveal` elements toggle with scroll; `.parallax` elements scrub
pub fn mount_globals(clock: &ClockHandle, page: &PortfolioPage) -> Result<Scope> {
    let scope = Scope::named(clock, "globals");

    for element in page.resolve(".reveal") {
        let id = scope.add(AnimationPreset::reveal(&element, 50.0).finish()?);
        let trigger = ScrollTrigger::new(&element, ScrollMode::Toggle(ToggleActions::PlayReverse))
            .range("top 80%", "bottom 20%")?;
        scope.attach_scroll(id, trigger)?;
    }

    for element in page.resolve(".parallax") {
        let id = scope.add(AnimationPreset::parallax(&element, -50.0).finish()?);
        let trigger = ScrollTrigger::new(&element, ScrollMode::Scrub).range("top bottom", "bottom top")?;
        scope.attach_scroll(id, trigger)?;
    }

    tracing::debug!(bindings = scope.bindings().len(), "global scroll bindings installed");
    Ok(scope)
}

// ============================================================================
// Interactions
// ============================================================================

// Interactions repeat for as long as the page is open, so everything they
// schedule is transient.

/// Open or close the mobile menu
pub fn toggle_menu(scope: &Scope, page: &PortfolioPage, open: bool) -> Result<()> {
    let menu = Targets::query(page, ".mobile-menu");

    if open {
        scope.add_transient(Tween::set(menu.clone(), &[("visible", Value::number(1.0))]));
        let panel = Tween::build(menu)
            .from_to("opacity", 0.0, 1.0)
            .from_to("scale", 0.95, 1.0)
            .duration(0.3)
            .ease(Easing::EaseOutCubic)
            .finish()?;
        scope.add_transient(panel);

        let items = Tween::build(Targets::query(page, ".mobile-menu-item"))
            .from_to("opacity", 0.0, 1.0)
            .from_to("y", Value::px(20.0), Value::px(0.0))
            .duration(0.4)
            .delay(0.1)
            .finish()?;
        scope.add_transient(stagger(items, &Stagger::new(0.1)));
    } else {
        let hidden = menu.clone();
        let panel = Tween::build(menu)
            .to("opacity", 0.0)
            .to("scale", 0.95)
            .duration(0.3)
            .ease(Easing::EaseInCubic)
            .on_complete(move || {
                for target in hidden.upgrade_all() {
                    if let Ok(mut target) = target.try_borrow_mut() {
                        target.set("visible", Value::number(0.0));
                    }
                }
            })
            .finish()?;
        scope.add_transient(panel);
    }
    Ok(())
}

/// Press feedback on the submit button once the (simulated) send finishes
pub fn submit_feedback(scope: &Scope, page: &PortfolioPage, send_delay: f64) -> Result<AnimationId> {
    let press = AnimationPreset::press_feedback(Targets::query(page, ".submit-btn"), 1.05).finish()?;
    let mut press = Some(press);
    let owner = scope.clone();
    Ok(scope.run(|| {
        scope.clock().delayed_call(send_delay, move || {
            if let Some(press) = press.take() {
                owner.add_transient(press);
            }
        })
    }))
}

/// Orbs lean toward the pointer, relative to the viewport center
pub fn pointer_drift(scope: &Scope, page: &PortfolioPage, x: f32, y: f32) -> Result<AnimationId> {
    let viewport = page.viewport();
    let dx = (x - viewport.width / 2.0) * 0.02;
    let dy = (y - viewport.height / 2.0) * 0.02;
    let drift = AnimationPreset::pointer_drift(Targets::query(page, ".floating-orb"), dx, dy).finish()?;
    Ok(scope.add_transient(drift))
}

use bevy::prelude::*;
use color_eyre::eyre::Result;

use phalanx::math::*;
use phalanx::{
    spawn_formation, BoidConfig, FormationLayout, FormationMindPlugin, PlaceObstacleEvent,
    SetFormationTarget, Steering,
};

/// Headless demo: the four-slot reference formation crosses the field toward
/// a commanded point with one obstacle on the way.
fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .add_plugins(FormationMindPlugin);

    let layout = FormationLayout::new(
        vec![
            TVec3::new(-3., 0., -1.5),
            TVec3::new(3., 0., -1.5),
            TVec3::new(-3., 0., 1.5),
            TVec3::new(3., 0., 1.5),
        ],
        vec![-TVec3::Z; 4],
    )?;
    let formation = {
        let mut queue = bevy::ecs::system::CommandQueue::default();
        let mut commands = Commands::new(&mut queue, &app.world);
        let formation =
            spawn_formation(&mut commands, layout, &BoidConfig::default(), TVec3::ZERO)?;
        queue.apply(&mut app.world);
        formation
    };

    app.world.send_event(SetFormationTarget {
        formation,
        point: TVec3::new(10., 0., 10.),
    });
    app.world.send_event(PlaceObstacleEvent {
        point: TVec3::new(5., 0., 5.),
    });

    for _ in 0..800 {
        app.update();
        std::thread::sleep(std::time::Duration::from_millis(8));
    }

    let mut arrived = 0;
    let mut boids = app.world.query::<(&Steering, &Transform)>();
    for (steering, xform) in boids.iter(&app.world) {
        tracing::info!(pos = ?xform.translation, arrived = steering.arrived(), "boid");
        if steering.arrived() {
            arrived += 1;
        }
    }
    tracing::info!(arrived, "simulation done");

    Ok(())
}

//! Minimal kinematic stand-in for the external physics step: consumes the
//! steering outputs and applies them to the transforms. A host application
//! with its own integrator or collision resolution replaces this system.

use bevy::prelude::*;

use crate::boid::steering::{AngularRoutineOutput, LinearRoutineOutput};

pub fn apply_motion(
    mut boids: Query<(&mut Transform, &LinearRoutineOutput, &AngularRoutineOutput)>,
    time: Res<Time>,
) {
    let dt = time.delta_seconds();
    for (mut xform, lin_out, ang_out) in boids.iter_mut() {
        xform.translation += lin_out.0 * dt;
        xform.rotation = ang_out.0;
    }
}

/*
 * Boid Flocking Simulation - Viewer
 *
 * Opens a window with the running flock and a control panel. Build with
 * `--features viewer`.
 */

fn main() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
    flockers::viewer::run();
}

//! Text rendition of the director's debug overlay.

use std::time::Duration;

use horde_core::DirectorSnapshot;

/// Formats a duration as `mm:ss.cc`.
pub(crate) fn format_time(time: Duration) -> String {
    let centis = time.as_millis() / 10;
    let minutes = centis / 6_000;
    let seconds = (centis / 100) % 60;
    let hundredths = centis % 100;
    format!("{minutes:02}:{seconds:02}.{hundredths:02}")
}

/// Builds the overlay lines for the provided snapshot.
pub(crate) fn overlay_lines(snapshot: &DirectorSnapshot, live_enemies: u32) -> Vec<String> {
    let wave = snapshot
        .current_wave
        .map_or_else(|| "-".to_owned(), |wave| wave.to_string());

    vec![
        format!("CurrentWave: {wave} ({})", snapshot.phase),
        format!("IsWaveRunning: {}", snapshot.is_wave_running),
        format!("WaveTimer: {}", format_time(snapshot.wave_elapsed)),
        format!("Cooldown: {}", format_time(snapshot.cooldown_remaining)),
        format!("MaxEnemiesAlive: {}", snapshot.max_enemies_alive),
        format!("AliveEnemies: {live_enemies}"),
        format!(
            "SpawnedInWave: {}/{}",
            snapshot.enemies_spawned_in_current_wave, snapshot.current_wave_total
        ),
        format!("SpawnInterval: {}", format_time(snapshot.spawn_interval)),
        format!("AllEnemiesSpawned: {}", snapshot.all_enemies_spawned),
    ]
}

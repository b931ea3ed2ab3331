//! Scripted loadout session
//!
//! Loads `config/loadout.toml` (or the path given as the first argument),
//! then plays a short pickup/equip/fire/reload session and logs what the
//! ammo counters do. Use `RUST_LOG=debug` to see every state change.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use loadout::{
    AmmoStatus, DroppedItem, EquippedWeapon, LoadoutConfig, Player, PlayerAction,
};

fn main() -> Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => LoadoutConfig::load_from_path(&PathBuf::from(path)),
        None => LoadoutConfig::load(),
    };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .context("invalid log filter")?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let catalog = config.catalog();
    info!(items = catalog.len(), weapons = catalog.weapons().len(), "catalog loaded");

    let mut player = Player::new(&config, catalog);
    player.inventory_mut().subscribe(|inventory| {
        let used = inventory.slots().iter().filter(|slot| !slot.is_empty()).count();
        info!(used, capacity = inventory.capacity(), "inventory changed");
    });
    player
        .equipment_mut()
        .subscribe_weapon_changed(|weapon: &Option<EquippedWeapon>| match weapon {
            Some(weapon) => info!(weapon = %weapon.item().name, ammo = %weapon.ammo_status(), "weapon in hand"),
            None => info!("hands empty"),
        });

    // Loot lying around
    for (id, quantity) in [("pistol", 1), ("pistol_ammo", 20), ("rifle", 1), ("rifle_ammo", 45)] {
        let item = player
            .catalog()
            .get(id)
            .cloned()
            .with_context(|| format!("catalog has no `{id}`"))?;
        let mut dropped = DroppedItem::new(item, quantity);
        if !player.pickup(&mut dropped) {
            info!(id, left = dropped.quantity, "could not carry everything");
        }
    }

    player.apply(PlayerAction::QuickSlot(1));
    if let Some(pistol) = player.equipment_mut().active_mut() {
        pistol.subscribe_ammo(|status: &AmmoStatus| info!(ammo = %status, "pistol"));
    }
    for _ in 0..3 {
        player.apply(PlayerAction::FireStart);
    }
    player.apply(PlayerAction::Reload);

    player.apply(PlayerAction::NextWeapon);
    player.apply(PlayerAction::FireStart);
    let fired = player.tick(0.5);
    player.apply(PlayerAction::FireStop);
    info!(fired, "burst finished");
    player.apply(PlayerAction::Reload);

    player.apply(PlayerAction::Unload);
    let stowed = player.stow_buffer();
    player.apply(PlayerAction::Holster);

    info!(
        stowed,
        pistol_ammo = player.total_ammo("pistol_ammo"),
        rifle_ammo = player.total_ammo("rifle_ammo"),
        holstered = ?player.equipment().holstered_ids(),
        "session over"
    );
    Ok(())
}

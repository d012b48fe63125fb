//! Output rendering for the mirror spec engine: containerd `hosts.toml`,
//! K3d's `mirrors:` YAML block, and Talos machine config patches.

pub mod hosts_toml;
pub mod k3d;
pub mod talos;

pub use hosts_toml::render_hosts_toml;
pub use k3d::render_k3d_mirror_config;
pub use talos::render_talos_mirror_patch;

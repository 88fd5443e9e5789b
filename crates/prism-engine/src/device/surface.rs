use winit::dpi::PhysicalSize;

use super::SurfaceErrorAction;

pub(crate) fn choose_surface_format(
    caps: &wgpu::SurfaceCapabilities,
    prefer_srgb: bool,
) -> Option<wgpu::TextureFormat> {
    let first = caps.formats.first().copied()?;

    if prefer_srgb {
        if let Some(f) = caps.formats.iter().copied().find(|f| f.is_srgb()) {
            return Some(f);
        }
    }

    Some(first)
}

pub(crate) fn choose_alpha_mode(
    caps: &wgpu::SurfaceCapabilities,
    preferred: &[wgpu::CompositeAlphaMode],
) -> wgpu::CompositeAlphaMode {
    preferred
        .iter()
        .copied()
        .find(|m| caps.alpha_modes.contains(m))
        .or_else(|| caps.alpha_modes.first().copied())
        .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}

/// Applies a new drawable size. Zero-sized windows (minimized) only record the size;
/// configuration is deferred until the window has area again.
pub(crate) fn apply_resize(
    surface: &wgpu::Surface,
    device: &wgpu::Device,
    config: &mut wgpu::SurfaceConfiguration,
    size: &mut PhysicalSize<u32>,
    new_size: PhysicalSize<u32>,
) {
    *size = new_size;
    if new_size.width == 0 || new_size.height == 0 {
        return;
    }

    config.width = new_size.width;
    config.height = new_size.height;
    surface.configure(device, config);
}

pub(crate) fn map_surface_error(
    surface: &wgpu::Surface,
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,
    err: wgpu::SurfaceError,
) -> SurfaceErrorAction {
    match err {
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
            if size.width > 0 && size.height > 0 {
                surface.configure(device, config);
            }
            SurfaceErrorAction::Reconfigured
        }
        wgpu::SurfaceError::OutOfMemory => SurfaceErrorAction::Fatal,
        wgpu::SurfaceError::Timeout | wgpu::SurfaceError::Other => SurfaceErrorAction::SkipFrame,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::{CompositeAlphaMode as Alpha, TextureFormat as Format};

    fn caps(formats: Vec<Format>, alpha_modes: Vec<Alpha>) -> wgpu::SurfaceCapabilities {
        wgpu::SurfaceCapabilities {
            formats,
            alpha_modes,
            ..Default::default()
        }
    }

    #[test]
    fn srgb_format_preferred_when_asked() {
        let c = caps(vec![Format::Bgra8Unorm, Format::Bgra8UnormSrgb], vec![]);
        assert_eq!(choose_surface_format(&c, true), Some(Format::Bgra8UnormSrgb));
        assert_eq!(choose_surface_format(&c, false), Some(Format::Bgra8Unorm));
        assert_eq!(choose_surface_format(&caps(vec![], vec![]), true), None);
    }

    #[test]
    fn translucent_alpha_mode_wins_when_supported() {
        let preferred = [Alpha::PreMultiplied, Alpha::PostMultiplied];

        let c = caps(vec![], vec![Alpha::Opaque, Alpha::PostMultiplied]);
        assert_eq!(choose_alpha_mode(&c, &preferred), Alpha::PostMultiplied);

        let c = caps(vec![], vec![Alpha::Opaque]);
        assert_eq!(choose_alpha_mode(&c, &preferred), Alpha::Opaque);

        assert_eq!(choose_alpha_mode(&caps(vec![], vec![]), &preferred), Alpha::Auto);
    }
}

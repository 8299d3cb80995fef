//! Overlay mode and filter toggles.

use leptos::prelude::*;

use crate::render_state::{OverlayMode, RenderState};
use crate::topology::{Severity, SolutionType};

const SOLUTION_FILTERS: [SolutionType; 4] = [
	SolutionType::Antivirus,
	SolutionType::Edr,
	SolutionType::Drm,
	SolutionType::Firewall,
];

const SEVERITY_FILTERS: [Severity; 4] = [
	Severity::Critical,
	Severity::High,
	Severity::Medium,
	Severity::Low,
];

fn networks_badge(count: usize) -> String {
	match count {
		1 => "1 network".to_string(),
		n => format!("{n} networks"),
	}
}

/// Buttons that switch the color overlay and edit the active mode's filter.
///
/// An empty filter highlights every device.
#[component]
pub fn OverlayToolbar(
	render_state: RwSignal<RenderState>,
	#[prop(into)] network_count: Signal<usize>,
) -> impl IntoView {
	let overlay = move || render_state.with(|s| s.overlay);

	view! {
		<div class="overlay-toolbar">
			<span class="badge">{move || networks_badge(network_count.get())}</span>
			<button
				class:active=move || overlay() == OverlayMode::Coverage
				on:click=move |_| render_state.update(RenderState::toggle_coverage)
			>
				"🛡️ Coverage"
			</button>
			<button
				class:active=move || overlay() == OverlayMode::Vulnerability
				on:click=move |_| render_state.update(RenderState::toggle_vulnerability)
			>
				"⚠️ Vulnerabilities"
			</button>

			<Show when=move || overlay() == OverlayMode::Coverage>
				<span class="filter-label">"Missing:"</span>
				{SOLUTION_FILTERS
					.into_iter()
					.map(|kind| {
						view! {
							<button
								class="filter-chip"
								class:active=move || render_state.with(|s| s.coverage_filter.contains(&kind))
								on:click=move |_| render_state.update(|s| s.toggle_coverage_filter(kind))
							>
								{kind.as_str()}
							</button>
						}
					})
					.collect_view()}
			</Show>

			<Show when=move || overlay() == OverlayMode::Vulnerability>
				<span class="filter-label">"Severity:"</span>
				{SEVERITY_FILTERS
					.into_iter()
					.map(|severity| {
						view! {
							<button
								class="filter-chip"
								class:active=move || render_state.with(|s| s.severity_filter.contains(&severity))
								on:click=move |_| render_state.update(|s| s.toggle_severity_filter(severity))
							>
								{severity.as_str()}
							</button>
						}
					})
					.collect_view()}
			</Show>
		</div>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn badge_counts_networks() {
		assert_eq!(networks_badge(0), "0 networks");
		assert_eq!(networks_badge(1), "1 network");
		assert_eq!(networks_badge(12), "12 networks");
	}
}

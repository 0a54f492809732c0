use leptos::ev;
use leptos::prelude::*;
use leptos_dom::helpers::window_event_listener;

use crate::components::ui::{
    ActionsNotesSection, FlexRow, NoteBox, NoteBoxKind, NotesPopup, NotesSubsection, SectionHeader,
    SectionTitle, SheetSection,
};
use crate::state::AppContext;

const ABILITIES: [(&str, &str); 6] = [
    ("STR", "Strength"),
    ("DEX", "Dexterity"),
    ("CON", "Constitution"),
    ("INT", "Intelligence"),
    ("WIS", "Wisdom"),
    ("CHA", "Charisma"),
];

const SKILLS: [&str; 8] = [
    "Acrobatics",
    "Arcana",
    "Athletics",
    "Insight",
    "Perception",
    "Persuasion",
    "Stealth",
    "Survival",
];

/// The character sheet itself. Layout behavior (auto-growing note boxes,
/// row equalization, the notes popup) is wired by the components; this page
/// only arranges them.
#[component]
pub fn SheetPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();

    // Breakpoint crossings and reflowing text both change what a note box
    // needs; re-fit everything on window resize.
    let sizer = app_state.0.sizer.clone();
    let resize_handle = window_event_listener(ev::resize, move |_| sizer.refit_all());
    on_cleanup(move || resize_handle.remove());

    view! {
        <div class="min-h-screen bg-background">
            <div class="mx-auto w-full max-w-[1080px] px-4 py-8">
                <header class="mb-4 flex flex-wrap items-end justify-between gap-3">
                    <div class="space-y-1">
                        <h1 class="text-xl font-semibold">"Character Sheet"</h1>
                        <p class="text-xs text-muted-foreground">"Session-local; nothing leaves the page."</p>
                    </div>
                    <div class="flex flex-wrap items-center gap-2">
                        <input
                            class="h-9 rounded-md border bg-transparent px-3 text-sm outline-none focus-visible:ring-2 focus-visible:ring-ring"
                            name="character-name"
                            placeholder="Character name"
                        />
                        <input
                            class="h-9 w-36 rounded-md border bg-transparent px-3 text-sm outline-none focus-visible:ring-2 focus-visible:ring-ring"
                            name="character-class"
                            placeholder="Class"
                        />
                        <input
                            class="h-9 w-20 rounded-md border bg-transparent px-3 text-sm outline-none focus-visible:ring-2 focus-visible:ring-ring"
                            name="character-level"
                            placeholder="Lvl"
                        />
                    </div>
                </header>

                <FlexRow class="mb-3">
                    <SheetSection>
                        <SectionHeader>
                            <SectionTitle>"Abilities"</SectionTitle>
                        </SectionHeader>
                        <div class="grid grid-cols-3 gap-2">
                            {ABILITIES
                                .into_iter()
                                .map(|(abbr, full)| {
                                    view! {
                                        <div class="flex flex-col items-center gap-1 rounded-md border p-2">
                                            <span class="text-xs font-medium text-muted-foreground" title=full>
                                                {abbr}
                                            </span>
                                            <input
                                                class="w-12 rounded-md border bg-transparent text-center text-sm"
                                                name=format!("ability-{}", abbr.to_lowercase())
                                                value="10"
                                            />
                                        </div>
                                    }
                                })
                                .collect_view()}
                        </div>
                    </SheetSection>

                    <SheetSection>
                        <SectionHeader>
                            <SectionTitle>"Combat"</SectionTitle>
                        </SectionHeader>
                        <div class="flex flex-col gap-2 text-sm">
                            <label class="flex items-center justify-between gap-2">
                                "Armor Class"
                                <input class="w-16 rounded-md border bg-transparent text-center" name="armor-class" value="10" />
                            </label>
                            <label class="flex items-center justify-between gap-2">
                                "Hit Points"
                                <input class="w-16 rounded-md border bg-transparent text-center" name="hit-points" value="8" />
                            </label>
                            <label class="flex items-center justify-between gap-2">
                                "Speed"
                                <input class="w-16 rounded-md border bg-transparent text-center" name="speed" value="30" />
                            </label>
                        </div>
                    </SheetSection>

                    <SheetSection>
                        <SectionHeader>
                            <SectionTitle>"Skills"</SectionTitle>
                        </SectionHeader>
                        <ul class="flex flex-col gap-1 text-sm">
                            {SKILLS
                                .into_iter()
                                .map(|skill| {
                                    view! {
                                        <li class="flex items-center justify-between gap-2">
                                            {skill}
                                            <input
                                                class="w-12 rounded-md border bg-transparent text-center"
                                                name=format!("skill-{}", skill.to_lowercase())
                                                value="+0"
                                            />
                                        </li>
                                    }
                                })
                                .collect_view()}
                        </ul>
                        <NoteBox
                            name="skill-notes"
                            kind=NoteBoxKind::TableNotes
                            placeholder="Skill notes"
                        />
                    </SheetSection>
                </FlexRow>

                <div id="notes-column" class="mb-3">
                    <FlexRow>
                        <NotesSubsection>
                            <SectionHeader>
                                <SectionTitle>"Background"</SectionTitle>
                            </SectionHeader>
                            <NoteBox
                                name="background-notes"
                                popup_title="Background"
                                placeholder="Where does this character come from?"
                            />
                        </NotesSubsection>

                        <NotesSubsection>
                            <SectionHeader>
                                <SectionTitle>"Allies & Organizations"</SectionTitle>
                            </SectionHeader>
                            <NoteBox
                                name="allies-notes"
                                popup_title="Allies & Organizations"
                                placeholder="Friends, factions, favors owed"
                            />
                        </NotesSubsection>

                        <NotesSubsection>
                            <SectionHeader>
                                <SectionTitle>"Treasure"</SectionTitle>
                            </SectionHeader>
                            <NoteBox
                                name="treasure-notes"
                                popup_title="Treasure"
                                placeholder="Loot, trinkets, IOUs"
                            />
                        </NotesSubsection>
                    </FlexRow>
                </div>

                <ActionsNotesSection class="mb-3">
                    <SectionHeader>
                        <SectionTitle>"Actions & Reactions"</SectionTitle>
                    </SectionHeader>
                    <NoteBox
                        name="actions-notes"
                        popup_title="Actions & Reactions"
                        placeholder="Attacks, reactions, special moves"
                    />
                </ActionsNotesSection>

                <FlexRow>
                    <SheetSection>
                        <SectionHeader>
                            <SectionTitle>"Feats & Traits"</SectionTitle>
                        </SectionHeader>
                        <ul class="list-disc pl-4 text-sm text-muted-foreground">
                            <li>"Darkvision"</li>
                            <li>"Lucky"</li>
                            <li>"Brave"</li>
                        </ul>
                    </SheetSection>

                    <SheetSection>
                        <SectionHeader>
                            <SectionTitle>"Proficiencies & Languages"</SectionTitle>
                        </SectionHeader>
                        <ul class="list-disc pl-4 text-sm text-muted-foreground">
                            <li>"Common, Halfling"</li>
                            <li>"Light armor, simple weapons"</li>
                            <li>"Thieves' tools"</li>
                        </ul>
                    </SheetSection>

                    <SheetSection>
                        <SectionHeader>
                            <SectionTitle>"Training"</SectionTitle>
                        </SectionHeader>
                        // Stretches to match the row's tallest sibling panel.
                        <NoteBox
                            name="training"
                            kind=NoteBoxKind::Basic
                            placeholder="Downtime training, goals, progress"
                        />
                    </SheetSection>
                </FlexRow>
            </div>

            <NotesPopup />
        </div>
    }
}

use std::collections::{HashMap, HashSet};

use crate::dataset::{Dataset, Ingredient};
use crate::layout::{NodeKey, NodeKind};
use crate::util::format_stack_count;

pub type PlanPath = Vec<usize>;

pub fn crafts_needed(count: u64, result_count: u32) -> u64 {
    count.div_ceil(u64::from(result_count.max(1)))
}

/// What to plan when a graph node is picked. A recipe plans one batch of its
/// result.
pub fn target_for(dataset: &Dataset, key: &NodeKey) -> Option<(Ingredient, u64)> {
    match key.kind {
        NodeKind::Item => Some((Ingredient::Item(key.id.clone()), 1)),
        NodeKind::Tag => Some((Ingredient::Tag(key.id.clone()), 1)),
        NodeKind::Recipe => dataset.recipes.get(&key.id).map(|recipe| {
            (
                Ingredient::Item(recipe.result.item.clone()),
                u64::from(recipe.result.count),
            )
        }),
    }
}

/// Repeated ingredients collapse into one entry with their multiplicity,
/// in first-appearance order.
pub fn stack_ingredients(ingredients: &[Ingredient]) -> Vec<(&Ingredient, u64)> {
    let mut stacked: Vec<(&Ingredient, u64)> = Vec::new();
    for ingredient in ingredients {
        match stacked.iter_mut().find(|(known, _)| *known == ingredient) {
            Some((_, multiplicity)) => *multiplicity += 1,
            None => stacked.push((ingredient, 1)),
        }
    }
    stacked
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlanChoices {
    selected: HashMap<PlanPath, usize>,
    expanded: HashSet<PlanPath>,
    split: HashSet<PlanPath>,
}

impl PlanChoices {
    pub fn selected(&self, path: &[usize], options: usize) -> usize {
        if options == 0 {
            return 0;
        }
        self.selected.get(path).copied().unwrap_or(0) % options
    }

    pub fn is_expanded(&self, path: &[usize]) -> bool {
        self.expanded.contains(path)
    }

    pub fn is_split(&self, path: &[usize]) -> bool {
        self.split.contains(path)
    }

    pub fn cycle(&mut self, path: &[usize], options: usize, forward: bool) {
        if options < 2 {
            return;
        }

        let current = self.selected(path, options);
        let next = if forward {
            (current + 1) % options
        } else {
            (current + options - 1) % options
        };
        self.selected.insert(path.to_vec(), next);
        self.forget_below(path);
    }

    pub fn toggle_expanded(&mut self, path: &[usize]) {
        if !self.expanded.remove(path) {
            self.expanded.insert(path.to_vec());
        }
    }

    pub fn toggle_split(&mut self, path: &[usize]) {
        if !self.split.remove(path) {
            self.split.insert(path.to_vec());
            self.expanded.insert(path.to_vec());
        }
        self.forget_below(path);
    }

    // Children are rebuilt from scratch after a choice changes.
    fn forget_below(&mut self, path: &[usize]) {
        let below = |other: &PlanPath| other.len() > path.len() && other.starts_with(path);
        self.selected.retain(|other, _| !below(other));
        self.expanded.retain(|other| !below(other));
        self.split.retain(|other| !below(other));
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlanStep {
    Need {
        ingredient: Ingredient,
        count: u64,
        split: bool,
    },
    Recipe {
        options: Vec<String>,
        selected: usize,
        crafts: u64,
    },
    Member {
        options: Vec<String>,
        selected: usize,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlanNode {
    pub path: PlanPath,
    pub step: PlanStep,
    pub expanded: bool,
    pub children: Vec<PlanNode>,
}

impl PlanNode {
    pub fn title(&self) -> String {
        match &self.step {
            PlanStep::Need {
                ingredient, count, ..
            } => {
                format!(
                    "{count} ({}) {}",
                    format_stack_count(*count),
                    ingredient.id()
                )
            }
            PlanStep::Recipe {
                options,
                selected,
                crafts,
            } => match options.get(*selected) {
                Some(id) => format!("{id} x{crafts}"),
                None => "(no recipes)".to_owned(),
            },
            PlanStep::Member { options, selected } => match options.get(*selected) {
                Some(item) => item.clone(),
                None => "(no items)".to_owned(),
            },
        }
    }

    pub fn choice_count(&self) -> usize {
        match &self.step {
            PlanStep::Need { .. } => 0,
            PlanStep::Recipe { options, .. } | PlanStep::Member { options, .. } => options.len(),
        }
    }

    fn is_dead_end(&self) -> bool {
        !matches!(self.step, PlanStep::Need { .. }) && self.choice_count() == 0
    }

    /// Quantities still to gather: every collapsed need, plus expanded needs
    /// with no recipe or no tag member to break them down.
    pub fn totals(&self) -> Vec<(Ingredient, u64)> {
        let mut totals = Vec::new();
        self.collect_totals(&mut totals);
        totals
    }

    fn collect_totals(&self, totals: &mut Vec<(Ingredient, u64)>) {
        if let PlanStep::Need {
            ingredient, count, ..
        } = &self.step
            && self.children.iter().all(PlanNode::is_dead_end)
        {
            match totals.iter_mut().find(|(known, _)| known == ingredient) {
                Some((_, total)) => *total = total.saturating_add(*count),
                None => totals.push((ingredient.clone(), *count)),
            }
            return;
        }

        for child in &self.children {
            child.collect_totals(totals);
        }
    }
}

fn child_path(path: &[usize], index: usize) -> PlanPath {
    let mut child = Vec::with_capacity(path.len() + 1);
    child.extend_from_slice(path);
    child.push(index);
    child
}

#[derive(Clone, Debug, Default)]
pub struct Planner {
    producers: HashMap<String, Vec<String>>,
}

impl Planner {
    pub fn new(dataset: &Dataset) -> Self {
        let mut producers: HashMap<String, Vec<String>> = HashMap::new();
        for (id, recipe) in &dataset.recipes {
            producers
                .entry(recipe.result.item.clone())
                .or_default()
                .push(id.clone());
        }
        Self { producers }
    }

    pub fn recipes_for(&self, item: &str) -> &[String] {
        self.producers.get(item).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn plan(
        &self,
        dataset: &Dataset,
        target: &Ingredient,
        count: u64,
        choices: &PlanChoices,
    ) -> PlanNode {
        self.need(dataset, Vec::new(), target.clone(), count, choices)
    }

    fn need(
        &self,
        dataset: &Dataset,
        path: PlanPath,
        ingredient: Ingredient,
        count: u64,
        choices: &PlanChoices,
    ) -> PlanNode {
        let expanded = choices.is_expanded(&path);
        let split = choices.is_split(&path);

        let children = if !expanded {
            Vec::new()
        } else if split {
            let half = count / 2;
            [half, count - half]
                .into_iter()
                .enumerate()
                .map(|(index, part)| {
                    self.need(
                        dataset,
                        child_path(&path, index),
                        ingredient.clone(),
                        part,
                        choices,
                    )
                })
                .collect()
        } else {
            let below = child_path(&path, 0);
            vec![match &ingredient {
                Ingredient::Item(item) => self.recipe(dataset, below, item, count, choices),
                Ingredient::Tag(tag) => self.member(dataset, below, tag, count, choices),
            }]
        };

        PlanNode {
            path,
            step: PlanStep::Need {
                ingredient,
                count,
                split,
            },
            expanded,
            children,
        }
    }

    fn recipe(
        &self,
        dataset: &Dataset,
        path: PlanPath,
        item: &str,
        count: u64,
        choices: &PlanChoices,
    ) -> PlanNode {
        let options = self.recipes_for(item).to_vec();
        let selected = choices.selected(&path, options.len());

        let (crafts, children) = match options
            .get(selected)
            .and_then(|id| dataset.recipes.get(id))
        {
            Some(recipe) => {
                let crafts = crafts_needed(count, recipe.result.count);
                let children = stack_ingredients(&recipe.ingredients)
                    .into_iter()
                    .enumerate()
                    .map(|(index, (ingredient, multiplicity))| {
                        self.need(
                            dataset,
                            child_path(&path, index),
                            ingredient.clone(),
                            crafts.saturating_mul(multiplicity),
                            choices,
                        )
                    })
                    .collect();
                (crafts, children)
            }
            None => (0, Vec::new()),
        };

        PlanNode {
            path,
            step: PlanStep::Recipe {
                options,
                selected,
                crafts,
            },
            expanded: true,
            children,
        }
    }

    fn member(
        &self,
        dataset: &Dataset,
        path: PlanPath,
        tag: &str,
        count: u64,
        choices: &PlanChoices,
    ) -> PlanNode {
        let options = dataset
            .tags
            .get(tag)
            .map(|members| members.iter().cloned().collect::<Vec<_>>())
            .unwrap_or_default();
        let selected = choices.selected(&path, options.len());

        let children = options
            .get(selected)
            .map(|item| {
                vec![self.need(
                    dataset,
                    child_path(&path, 0),
                    Ingredient::Item(item.clone()),
                    count,
                    choices,
                )]
            })
            .unwrap_or_default();

        PlanNode {
            path,
            step: PlanStep::Member { options, selected },
            expanded: true,
            children,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Recipe, RecipeResult};

    fn item(id: &str) -> Ingredient {
        Ingredient::Item(id.to_owned())
    }

    fn tag(id: &str) -> Ingredient {
        Ingredient::Tag(id.to_owned())
    }

    fn recipe(ingredients: Vec<Ingredient>, result: &str, count: u32) -> Recipe {
        Recipe {
            ingredients,
            result: RecipeResult {
                item: result.to_owned(),
                count,
            },
        }
    }

    fn dataset() -> Dataset {
        let mut dataset = Dataset::default();
        for id in ["stick", "oak_planks", "spruce_planks", "torch", "coal", "charcoal"] {
            dataset.add_item(id);
        }
        dataset.add_tag("#planks", ["oak_planks", "spruce_planks"]);
        dataset.add_recipe("stick", recipe(vec![tag("#planks"), tag("#planks")], "stick", 4));
        dataset.add_recipe("torch", recipe(vec![item("coal"), item("stick")], "torch", 4));
        dataset.add_recipe(
            "torch_from_charcoal",
            recipe(vec![item("charcoal"), item("stick")], "torch", 4),
        );
        dataset
    }

    fn need_count(node: &PlanNode) -> u64 {
        match node.step {
            PlanStep::Need { count, .. } => count,
            _ => panic!("expected a need, got {:?}", node.step),
        }
    }

    #[test]
    fn picked_recipe_plans_one_batch() {
        let dataset = dataset();
        assert_eq!(
            target_for(&dataset, &NodeKey::new(NodeKind::Recipe, "torch_from_charcoal")),
            Some((item("torch"), 4))
        );
        assert_eq!(
            target_for(&dataset, &NodeKey::new(NodeKind::Tag, "#planks")),
            Some((tag("#planks"), 1))
        );
        assert_eq!(target_for(&dataset, &NodeKey::new(NodeKind::Recipe, "missing")), None);
    }

    #[test]
    fn crafts_round_up() {
        assert_eq!(crafts_needed(100, 4), 25);
        assert_eq!(crafts_needed(101, 4), 26);
        assert_eq!(crafts_needed(1, 4), 1);
        assert_eq!(crafts_needed(0, 4), 0);
        assert_eq!(crafts_needed(5, 0), 5);
    }

    #[test]
    fn repeated_ingredients_stack() {
        let ingredients = vec![tag("#planks"), item("stick"), tag("#planks")];
        assert_eq!(
            stack_ingredients(&ingredients),
            vec![(&tag("#planks"), 2), (&item("stick"), 1)]
        );
    }

    #[test]
    fn stacked_ingredient_scales_with_crafts() {
        let dataset = dataset();
        let planner = Planner::new(&dataset);
        let mut choices = PlanChoices::default();
        choices.toggle_expanded(&[]);

        let root = planner.plan(&dataset, &item("stick"), 9, &choices);
        let recipe = &root.children[0];
        assert_eq!(
            recipe.step,
            PlanStep::Recipe {
                options: vec!["stick".to_owned()],
                selected: 0,
                crafts: 3,
            }
        );
        assert_eq!(recipe.children.len(), 1);
        assert_eq!(need_count(&recipe.children[0]), 6);
        assert_eq!(recipe.children[0].title(), "6 (6) #planks");
    }

    #[test]
    fn recipe_and_member_choices_cycle() {
        let dataset = dataset();
        let planner = Planner::new(&dataset);
        let mut choices = PlanChoices::default();
        choices.toggle_expanded(&[]);
        choices.cycle(&[0], 2, true);

        let root = planner.plan(&dataset, &item("torch"), 8, &choices);
        assert_eq!(root.children[0].title(), "torch_from_charcoal x2");

        choices.toggle_expanded(&[0, 1]);
        choices.toggle_expanded(&[0, 1, 0, 0]);
        choices.cycle(&[0, 1, 0, 0, 0], 2, false);
        let root = planner.plan(&dataset, &item("torch"), 8, &choices);
        let planks = &root.children[0].children[1].children[0].children[0];
        assert_eq!(planks.title(), "2 (2) #planks");
        assert_eq!(planks.children[0].title(), "spruce_planks");

        choices.cycle(&[0], 2, true);
        assert!(!choices.is_expanded(&[0, 1]));
    }

    #[test]
    fn split_halves_the_quantity() {
        let dataset = dataset();
        let planner = Planner::new(&dataset);
        let mut choices = PlanChoices::default();
        choices.toggle_split(&[]);

        let root = planner.plan(&dataset, &item("stick"), 7, &choices);
        let parts = root.children.iter().map(need_count).collect::<Vec<_>>();
        assert_eq!(parts, vec![3, 4]);

        choices.toggle_split(&[]);
        let root = planner.plan(&dataset, &item("stick"), 7, &choices);
        assert!(matches!(root.children[0].step, PlanStep::Recipe { .. }));
    }

    #[test]
    fn totals_merge_collapsed_needs() {
        let dataset = dataset();
        let planner = Planner::new(&dataset);
        let mut choices = PlanChoices::default();
        choices.toggle_expanded(&[]);
        choices.toggle_expanded(&[0, 1]);

        let root = planner.plan(&dataset, &item("torch"), 100, &choices);
        assert_eq!(
            root.totals(),
            vec![(item("coal"), 25), (tag("#planks"), 14)]
        );
    }

    #[test]
    fn raw_item_stays_a_total_when_expanded() {
        let dataset = dataset();
        let planner = Planner::new(&dataset);
        let mut choices = PlanChoices::default();
        choices.toggle_expanded(&[]);

        let root = planner.plan(&dataset, &item("coal"), 70, &choices);
        assert_eq!(root.children[0].title(), "(no recipes)");
        assert_eq!(root.title(), "70 (1 stack and 6) coal");
        assert_eq!(root.totals(), vec![(item("coal"), 70)]);
    }
}

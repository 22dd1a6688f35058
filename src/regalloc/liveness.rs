//! Backward liveness over a method's instruction list

use crate::ollir::{Instruction, Method};
use std::collections::{BTreeSet, HashMap};

pub type VarSet = BTreeSet<String>;

/// Per-instruction liveness sets, indexed like `Method::instructions`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Liveness {
    pub successors: Vec<Vec<usize>>,
    pub defs: Vec<VarSet>,
    pub uses: Vec<VarSet>,
    pub live_in: Vec<VarSet>,
    pub live_out: Vec<VarSet>,
}

impl Liveness {
    /// Relax `in = use ∪ (out − def)` and `out = ∪ in(succ)` until nothing changes
    pub fn analyze(method: &Method) -> Self {
        let instructions = &method.instructions;
        let successors = successors(instructions);
        let defs: Vec<VarSet> = instructions
            .iter()
            .map(|i| i.def().into_iter().map(str::to_string).collect())
            .collect();
        let uses: Vec<VarSet> = instructions
            .iter()
            .map(|i| i.uses().into_iter().map(str::to_string).collect())
            .collect();

        let n = instructions.len();
        let mut live_in = vec![VarSet::new(); n];
        let mut live_out = vec![VarSet::new(); n];
        let mut rounds = 0;
        loop {
            rounds += 1;
            let mut changed = false;
            for index in (0..n).rev() {
                let out: VarSet = successors[index]
                    .iter()
                    .flat_map(|s| live_in[*s].iter().cloned())
                    .collect();
                let mut input = uses[index].clone();
                input.extend(out.difference(&defs[index]).cloned());

                if out != live_out[index] || input != live_in[index] {
                    changed = true;
                    live_out[index] = out;
                    live_in[index] = input;
                }
            }
            if !changed {
                break;
            }
        }
        log::debug!("liveness for '{}' settled after {} rounds", method.name, rounds);

        Self { successors, defs, uses, live_in, live_out }
    }

    pub fn len(&self) -> usize {
        self.live_in.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live_in.is_empty()
    }
}

/// Control-flow successors of every instruction.
///
/// `goto` jumps only, a conditional branch may jump or fall through, `ret`
/// ends the path and everything else falls through.
pub fn successors(instructions: &[Instruction]) -> Vec<Vec<usize>> {
    let labels: HashMap<&str, usize> = instructions
        .iter()
        .enumerate()
        .filter_map(|(index, i)| match i {
            Instruction::Label(name) => Some((name.as_str(), index)),
            _ => None,
        })
        .collect();

    let next = |index: usize| (index + 1 < instructions.len()).then_some(index + 1);
    instructions
        .iter()
        .enumerate()
        .map(|(index, instruction)| match instruction {
            Instruction::Return(_) => Vec::new(),
            Instruction::Goto(label) => labels.get(label.as_str()).copied().into_iter().collect(),
            Instruction::Branch { target, .. } => {
                let mut succ: Vec<usize> = labels.get(target.as_str()).copied().into_iter().collect();
                if let Some(fall) = next(index) {
                    if !succ.contains(&fall) {
                        succ.push(fall);
                    }
                }
                succ
            }
            _ => next(index).into_iter().collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::BinaryOperator;
    use crate::ollir::{Element, OllirType, Rhs};
    use std::collections::BTreeMap;

    fn int(name: &str) -> Element {
        Element::operand(name, OllirType::Int)
    }

    fn method(instructions: Vec<Instruction>) -> Method {
        Method {
            name: "f".to_string(),
            is_public: true,
            is_static: false,
            params: Vec::new(),
            return_type: OllirType::Int,
            instructions,
            var_table: BTreeMap::new(),
        }
    }

    #[test]
    fn straight_line() {
        // a := 1; b := a + 1; ret b
        let m = method(vec![
            Instruction::Assign { dest: int("a"), rhs: Rhs::Single(Element::literal("1", OllirType::Int)) },
            Instruction::Assign {
                dest: int("b"),
                rhs: Rhs::Binary {
                    op: BinaryOperator::Add,
                    lhs: int("a"),
                    rhs: Element::literal("1", OllirType::Int),
                    ty: OllirType::Int,
                },
            },
            Instruction::Return(Some(int("b"))),
        ]);
        let live = Liveness::analyze(&m);

        assert!(live.live_in[0].is_empty());
        assert_eq!(live.live_out[0], VarSet::from(["a".to_string()]));
        assert_eq!(live.live_out[1], VarSet::from(["b".to_string()]));
        assert!(live.live_out[2].is_empty());
    }

    #[test]
    fn loop_keeps_counter_alive() {
        // loop: if (i) goto end; i := i; goto loop; end: ret i
        let m = method(vec![
            Instruction::Label("loop_0".to_string()),
            Instruction::Branch { cond: Rhs::Single(int("i")), target: "endloop_0".to_string() },
            Instruction::Assign { dest: int("i"), rhs: Rhs::Single(int("i")) },
            Instruction::Goto("loop_0".to_string()),
            Instruction::Label("endloop_0".to_string()),
            Instruction::Return(Some(int("i"))),
        ]);
        let live = Liveness::analyze(&m);

        assert_eq!(live.successors[1], vec![4, 2]);
        assert_eq!(live.successors[3], vec![0]);
        assert!(live.successors[5].is_empty());
        assert!(live.live_out[3].contains("i"));
        assert!(live.live_in[0].contains("i"));
    }
}

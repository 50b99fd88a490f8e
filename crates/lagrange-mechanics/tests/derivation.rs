//! End-to-end derivations through the pipeline.

use std::sync::atomic::{AtomicUsize, Ordering};

use approx::assert_relative_eq;
use lagrange_core::{parse, CoreError, Expr, Symbol, SymbolRegistry};
use lagrange_mechanics::{
    time_derivative, Assemble, DerivationError, EnergyInput, EquationOfMotion, EulerLagrange,
    InputSlot, Lagrangian, Pipeline,
};
use lagrange_simplify::{equivalent, simplify, Simplifier};

fn registry(coordinates: &[&str], parameters: &[&str]) -> SymbolRegistry {
    let mut reg = SymbolRegistry::new();
    for name in coordinates {
        reg.declare_coordinate(name).unwrap();
    }
    for name in parameters {
        reg.declare_parameter(name).unwrap();
    }
    reg
}

fn p(input: &str, reg: &SymbolRegistry) -> Expr {
    parse(input, reg).unwrap()
}

fn no_accelerations(e: &Expr) -> bool {
    !e.any(|n| n.as_symbol().is_some_and(Symbol::is_acceleration))
}

#[test]
fn simple_pendulum() {
    let reg = registry(&["theta"], &["m", "l", "g"]);
    let input = EnergyInput::new(
        p("(1/2)*m*l^2*dtheta^2", &reg),
        p("-m*g*l*cos(theta)", &reg),
    );
    let derivation = Pipeline::new(&reg).derive(input).unwrap();

    let [theta] = derivation.accelerations() else {
        panic!("one coordinate");
    };
    assert_eq!(theta.coordinate(), "theta");
    assert!(equivalent(theta.expr(), &p("-(g/l)*sin(theta)", &reg)));
    assert!(no_accelerations(theta.expr()));

    let value = theta
        .expr()
        .evaluate(&|s: &Symbol| match s.name() {
            "theta" => Some(0.3),
            "l" => Some(2.0),
            "g" => Some(9.81),
            _ => None,
        })
        .unwrap();
    assert_relative_eq!(value, -(9.81 / 2.0) * 0.3_f64.sin(), epsilon = 1e-12);
}

#[test]
fn double_pendulum_matches_closed_form() {
    let reg = registry(&["theta1", "theta2"], &["m1", "m2", "l1", "l2", "g"]);

    // Cartesian positions of the two bobs, y pointing up.
    let x1 = p("l1*sin(theta1)", &reg);
    let y1 = p("-l1*cos(theta1)", &reg);
    let x2 = &x1 + &p("l2*sin(theta2)", &reg);
    let y2 = &y1 - &p("l2*cos(theta2)", &reg);
    let speed_sq = |x: &Expr, y: &Expr| {
        let vx = time_derivative(&reg, x).unwrap();
        let vy = time_derivative(&reg, y).unwrap();
        Expr::powi(vx, 2) + Expr::powi(vy, 2)
    };

    let half = Expr::rational(1, 2);
    let kinetic = Expr::mul([half.clone(), p("m1", &reg), speed_sq(&x1, &y1)])
        + Expr::mul([half, p("m2", &reg), speed_sq(&x2, &y2)]);
    let potential = Expr::mul([p("m1*g", &reg), y1]) + Expr::mul([p("m2*g", &reg), y2]);

    let derivation = Pipeline::new(&reg)
        .derive(EnergyInput::new(kinetic, potential))
        .unwrap();
    let [a1, a2] = derivation.accelerations() else {
        panic!("two coordinates");
    };

    let den = "(2*m1 + m2 - m2*cos(2*theta1 - 2*theta2))";
    let expected1 = p(
        &format!(
            "(-g*(2*m1 + m2)*sin(theta1) - m2*g*sin(theta1 - 2*theta2) \
             - 2*sin(theta1 - theta2)*m2*(dtheta2^2*l2 + dtheta1^2*l1*cos(theta1 - theta2))) \
             / (l1*{den})"
        ),
        &reg,
    );
    let expected2 = p(
        &format!(
            "(2*sin(theta1 - theta2)*(dtheta1^2*l1*(m1 + m2) + g*(m1 + m2)*cos(theta1) \
             + dtheta2^2*l2*m2*cos(theta1 - theta2))) / (l2*{den})"
        ),
        &reg,
    );
    assert!(equivalent(a1.expr(), &expected1));
    assert!(equivalent(a2.expr(), &expected2));
    assert!(no_accelerations(a1.expr()) && no_accelerations(a2.expr()));

    // The mass matrix is symmetric.
    let m = derivation.mass_matrix();
    assert_eq!(m[(0, 1)], m[(1, 0)]);
}

#[test]
fn triple_pendulum_stays_in_lowest_terms() {
    let reg = registry(&["theta1", "theta2", "theta3"], &["g"]);

    // Unit masses and lengths, y pointing up.
    let mut x = Expr::zero();
    let mut y = Expr::zero();
    let mut kinetic = Expr::zero();
    let mut potential = Expr::zero();
    for name in ["theta1", "theta2", "theta3"] {
        x = &x + &p(&format!("sin({name})"), &reg);
        y = &y - &p(&format!("cos({name})"), &reg);
        let vx = time_derivative(&reg, &x).unwrap();
        let vy = time_derivative(&reg, &y).unwrap();
        kinetic = kinetic + Expr::rational(1, 2) * (Expr::powi(vx, 2) + Expr::powi(vy, 2));
        potential = potential + &p("g", &reg) * &y;
    }

    let derivation = Pipeline::new(&reg)
        .derive(EnergyInput::new(kinetic, potential))
        .unwrap();
    let accelerations = derivation.accelerations();
    assert_eq!(accelerations.len(), 3);
    for a in accelerations {
        assert!(no_accelerations(a.expr()));
        assert!(
            a.expr().node_count() < 100_000,
            "{} has {} nodes",
            a.coordinate(),
            a.expr().node_count()
        );
        assert_eq!(&simplify(a.expr()), a.expr());
    }

    // M * qdd = b at a sample state.
    let lookup = |s: &Symbol| match s.name() {
        "theta1" => Some(0.3),
        "theta2" => Some(-0.2),
        "theta3" => Some(0.7),
        "dtheta1" => Some(0.5),
        "dtheta2" => Some(-1.1),
        "dtheta3" => Some(0.4),
        "g" => Some(9.81),
        _ => None,
    };
    let simplifier = Simplifier::new();
    let value = |e: &Expr| e.evaluate(&lookup).unwrap();
    let qdd: Vec<f64> = accelerations.iter().map(|a| value(a.expr())).collect();
    let m = derivation.mass_matrix();
    let rhs = derivation.solution().rhs();
    for (i, b) in rhs.iter().enumerate() {
        let lhs: f64 = (0..3)
            .map(|j| value(&m[(i, j)].to_expr(&simplifier)) * qdd[j])
            .sum();
        assert_relative_eq!(lhs, value(&b.to_expr(&simplifier)), epsilon = 1e-9);
    }
}

#[test]
fn duplicated_coordinate_is_singular() {
    let reg = registry(&["a", "b"], &["m"]);
    let input = EnergyInput::new(p("m*(da + db)^2/2", &reg), Expr::zero());
    let err = Pipeline::new(&reg).derive(input).unwrap_err();
    assert_eq!(
        err,
        DerivationError::SingularMassMatrix {
            column: 1,
            coordinate: "b".to_string()
        }
    );
}

struct Counting<'a>(&'a AtomicUsize);

impl Assemble for Counting<'_> {
    fn assemble(
        &self,
        registry: &SymbolRegistry,
        lagrangian: &Lagrangian,
        forces: &[Expr],
    ) -> lagrange_mechanics::Result<Vec<EquationOfMotion>> {
        self.0.fetch_add(1, Ordering::SeqCst);
        EulerLagrange.assemble(registry, lagrangian, forces)
    }
}

#[test]
fn unbound_symbol_stops_before_assembly() {
    let reg = registry(&["x"], &["m"]);
    let mut elsewhere = SymbolRegistry::new();
    let k = elsewhere.declare_parameter("k").unwrap().expr();

    let calls = AtomicUsize::new(0);
    let pipeline = Pipeline::new(&reg).with_assembler(Counting(&calls));

    let input = EnergyInput::new(p("m*dx^2/2", &reg), Expr::mul([k, p("x^2", &reg)]));
    let err = pipeline.derive(input).unwrap_err();
    assert_eq!(
        err,
        DerivationError::UnboundSymbol {
            name: "k".to_string(),
            input: InputSlot::Potential
        }
    );
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    // A valid input reaches the assembler exactly once.
    let input = EnergyInput::new(p("m*dx^2/2", &reg), p("x^2", &reg));
    pipeline.derive(input).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn undeclared_name_fails_to_parse() {
    let reg = registry(&["x"], &[]);
    assert_eq!(
        parse("k*x", &reg).unwrap_err(),
        CoreError::UnboundSymbol {
            name: "k".to_string()
        }
    );
}

#[test]
fn damping_force_enters_solution() {
    let reg = registry(&["x"], &["m", "k", "c"]);
    let input = EnergyInput::new(p("m*dx^2/2", &reg), p("k*x^2/2", &reg))
        .with_forces(vec![p("-c*dx", &reg)]);
    let derivation = Pipeline::new(&reg).derive(input).unwrap();
    let solved = derivation.accelerations()[0].expr();
    assert!(equivalent(solved, &p("-(k*x + c*dx)/m", &reg)));
    assert!(solved.contains_symbol(reg.resolve("c").unwrap()));
}

struct Squared;

impl Assemble for Squared {
    // Quadratic in the acceleration, whatever the Lagrangian.
    fn assemble(
        &self,
        registry: &SymbolRegistry,
        _lagrangian: &Lagrangian,
        _forces: &[Expr],
    ) -> lagrange_mechanics::Result<Vec<EquationOfMotion>> {
        Ok(registry
            .coordinates()
            .iter()
            .map(|c| {
                let expr = Expr::powi(c.qddot(), 2) + c.q();
                EquationOfMotion::new(c.index(), c.name(), expr)
            })
            .collect())
    }
}

#[test]
fn non_affine_equation_rejected() {
    let reg = registry(&["x"], &[]);
    let pipeline = Pipeline::new(&reg).with_assembler(Squared);
    let input = EnergyInput::new(p("dx^2/2", &reg), Expr::zero());
    assert_eq!(
        pipeline.derive(input).unwrap_err(),
        DerivationError::NonAffineEquation {
            equation: 0,
            symbol: "ddx".to_string()
        }
    );
}

#[test]
fn derivation_is_deterministic() {
    let run = || {
        let reg = registry(&["a", "b"], &["m", "k"]);
        let input = EnergyInput::new(
            p("m*(da^2 + db^2)/2 + m*da*db*cos(a - b)", &reg),
            p("k*(a^2 + b^2)/2", &reg),
        );
        Pipeline::new(&reg)
            .derive(input)
            .unwrap()
            .accelerations()
            .iter()
            .map(|a| a.expr().to_string())
            .collect::<Vec<_>>()
    };
    let first = run();
    assert_eq!(first, run());
    assert_eq!(first.len(), 2);
}

#[test]
fn duplicate_names_rejected() {
    let mut reg = SymbolRegistry::new();
    reg.declare_coordinate("theta").unwrap();
    for clash in ["theta", "dtheta", "ddtheta"] {
        assert!(matches!(
            reg.declare_parameter(clash),
            Err(CoreError::DuplicateSymbol { .. })
        ));
    }
    assert!(matches!(
        reg.declare_coordinate("theta"),
        Err(CoreError::DuplicateSymbol { .. })
    ));
}

#[test]
fn empty_registry_rejected() {
    let reg = SymbolRegistry::new();
    let input = EnergyInput::new(Expr::zero(), Expr::zero());
    assert_eq!(
        Pipeline::new(&reg).derive(input).unwrap_err(),
        DerivationError::NoCoordinates
    );
}

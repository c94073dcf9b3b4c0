use ndarray::arr2;
use oalhs::{
    create_oalhs, Criterion, GeneticParams, Lhs, LhsKind, OptimumParams, RandomStream,
    SamplingMethod,
};

fn main() -> oalhs::Result<()> {
    let xlimits = arr2(&[[0., 1.], [-10., 10.], [5., 15.]]);
    let n = 10;

    println!("Take {n} samples in");
    println!("{xlimits}\n");

    println!("*** using random latin hypercube sampling");
    let samples = Lhs::new(&xlimits).kind(LhsKind::Classic).sample(n)?;
    println!("{samples}\n");

    println!("*** using centered latin hypercube sampling");
    let samples = Lhs::new(&xlimits).kind(LhsKind::Centered).sample(n)?;
    println!("{samples}\n");

    println!("*** using maximin optimum latin hypercube sampling");
    let params = OptimumParams::default()
        .criterion(Criterion::Maximin)
        .max_sweeps(5);
    let samples = Lhs::new(&xlimits)
        .kind(LhsKind::Optimum(params))
        .seed(42)
        .sample(n)?;
    println!("{samples}\n");

    println!("*** using genetic latin hypercube sampling");
    let samples = Lhs::new(&xlimits)
        .kind(LhsKind::Genetic(GeneticParams::default().pop(20)))
        .seed(42)
        .sample(n)?;
    println!("{samples}\n");

    println!("*** using optimized (ESE) latin hypercube sampling");
    let samples = Lhs::new(&xlimits).sample(n)?;
    println!("{samples}\n");

    println!("*** using an orthogonal array based latin hypercube");
    let mut rng = RandomStream::from_seed(42);
    let oalhs = create_oalhs(n, 3, true, true, &mut rng)?;
    println!("{}", oalhs.oa.levels());
    println!("{}", oalhs.design);
    Ok(())
}
